//! Parametergestuurde regeneratie van de wereld.
//!
//! De controller bezit de invoer, de toegepaste parameters en de huidige
//! wereld. Elke geaccepteerde parameterwijziging bouwt synchroon een nieuwe
//! wereld; pas als die volledig klaar is wordt de oude vervangen.

use std::rc::Rc;

use thiserror::Error;

use super::orchestrator::{GenerateError, Toolkit, generate};
use super::params::{ParamError, ParamValue, Params};
use super::world::World;
use crate::parse::{GeoInput, InputError, parse_str};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Regenerating,
}

/// Ontvanger van wereldwissels, bijvoorbeeld een renderer.
pub trait WorldSink {
    fn attach(&mut self, world: &Rc<World>);
    fn detach(&mut self, world: &Rc<World>);
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    #[error("er loopt al een regeneratie")]
    Busy,
    #[error("er is nog geen invoer geladen")]
    NoInput,
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

pub struct RegenerationController {
    input: Option<GeoInput>,
    params: Params,
    revision: u64,
    rebuild_count: u64,
    world: Option<Rc<World>>,
    state: ControllerState,
    toolkit: Toolkit,
    sink: Option<Box<dyn WorldSink>>,
}

impl RegenerationController {
    #[must_use]
    pub fn new(params: Params) -> Self {
        Self::with_toolkit(params, Toolkit::default())
    }

    #[must_use]
    pub fn with_toolkit(params: Params, toolkit: Toolkit) -> Self {
        Self {
            input: None,
            params,
            revision: 0,
            rebuild_count: 0,
            world: None,
            state: ControllerState::Idle,
            toolkit,
            sink: None,
        }
    }

    /// Koppelt een ontvanger; een bestaande wereld wordt direct aangeboden.
    pub fn set_sink(&mut self, mut sink: Box<dyn WorldSink>) {
        if let Some(world) = &self.world {
            sink.attach(world);
        }
        self.sink = Some(sink);
    }

    pub fn clear_sink(&mut self) -> Option<Box<dyn WorldSink>> {
        let mut sink = self.sink.take()?;
        if let Some(world) = &self.world {
            sink.detach(world);
        }
        Some(sink)
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[must_use]
    pub fn input(&self) -> Option<&GeoInput> {
        self.input.as_ref()
    }

    #[must_use]
    pub fn world(&self) -> Option<&Rc<World>> {
        self.world.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Aantal geaccepteerde parameterwijzigingen.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Aantal volledig uitgevoerde regeneraties.
    #[must_use]
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Vervangt de invoer en bouwt de wereld opnieuw.
    ///
    /// # Errors
    /// Bij een fatale fout blijven de vorige invoer en wereld staan.
    pub fn load_input(&mut self, input: GeoInput) -> Result<Rc<World>, ControllerError> {
        log::info!("invoer geladen: {} polygonen", input.polygon_count());
        let params = self.params.clone();
        self.commit(Some(input), params, self.revision)?;
        self.world.clone().ok_or(ControllerError::NoInput)
    }

    /// Leest een GeoJSON-document en laadt het als invoer.
    ///
    /// # Errors
    /// [`ControllerError::Input`] voor ongeldige documenten; verder als
    /// [`load_input`](Self::load_input).
    pub fn load_geojson(&mut self, text: &str) -> Result<Rc<World>, ControllerError> {
        if self.state == ControllerState::Regenerating {
            return Err(ControllerError::Busy);
        }
        let input = parse_str(text)?;
        self.load_input(input)
    }

    /// Wijzigt één parameter en regenereert. Geeft de canonieke naam terug.
    ///
    /// # Errors
    /// Ongeldige parameters worden geweigerd zonder regeneratie; een fatale
    /// regeneratiefout zet de vorige parameters terug.
    pub fn set_param(
        &mut self,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> Result<&'static str, ControllerError> {
        let mut candidate = self.params.clone();
        let canonical = candidate.set(name, value)?;
        self.commit(None, candidate, self.revision + 1)?;
        Ok(canonical)
    }

    /// Past meerdere parameters in één wijziging toe.
    ///
    /// # Errors
    /// Zie [`set_param`](Self::set_param); als één naam ongeldig is wordt niets
    /// toegepast.
    pub fn update_params<'a, I, V>(&mut self, updates: I) -> Result<(), ControllerError>
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Into<ParamValue>,
    {
        let mut candidate = self.params.clone();
        for (name, value) in updates {
            candidate.set(name, value)?;
        }
        self.commit(None, candidate, self.revision + 1)
    }

    /// Vervangt alle parameters.
    ///
    /// # Errors
    /// Zie [`set_param`](Self::set_param).
    pub fn replace_params(&mut self, params: Params) -> Result<(), ControllerError> {
        self.commit(None, params.sanitized(), self.revision + 1)
    }

    /// Bouwt de wereld opnieuw met de huidige invoer en parameters.
    ///
    /// # Errors
    /// [`ControllerError::NoInput`] zonder invoer; verder als
    /// [`set_param`](Self::set_param).
    pub fn regenerate(&mut self) -> Result<Rc<World>, ControllerError> {
        if self.state == ControllerState::Regenerating {
            return Err(ControllerError::Busy);
        }
        if self.input.is_none() {
            return Err(ControllerError::NoInput);
        }
        let params = self.params.clone();
        self.commit(None, params, self.revision)?;
        self.world.clone().ok_or(ControllerError::NoInput)
    }

    /// Bouwt een kandidaatwereld en wisselt die pas bij succes in, samen met
    /// `params`, `revision` en (indien gegeven) de nieuwe invoer.
    fn commit(
        &mut self,
        input: Option<GeoInput>,
        params: Params,
        revision: u64,
    ) -> Result<(), ControllerError> {
        if self.state == ControllerState::Regenerating {
            return Err(ControllerError::Busy);
        }

        let Some(source) = input.as_ref().or(self.input.as_ref()) else {
            // Zonder invoer worden alleen de parameters bewaard.
            self.params = params;
            self.revision = revision;
            return Ok(());
        };

        self.state = ControllerState::Regenerating;
        log::info!("regeneratie gestart (revisie {revision})");

        let result = generate(source, &params, &self.toolkit);
        self.state = ControllerState::Idle;

        let world = match result {
            Ok(world) => Rc::new(world),
            Err(err) => {
                log::warn!("regeneratie teruggedraaid naar revisie {}: {err}", self.revision);
                return Err(err.into());
            }
        };

        if let Some(sink) = self.sink.as_mut() {
            if let Some(previous) = &self.world {
                sink.detach(previous);
            }
            sink.attach(&world);
        }

        log::info!(
            "regeneratie klaar (revisie {revision}): {} meshes, {} driehoeken, {} overgeslagen",
            world.meshes.len(),
            world.triangle_count(),
            world.skipped.len()
        );

        self.world = Some(world);
        if let Some(input) = input {
            self.input = Some(input);
        }
        self.params = params;
        self.revision = revision;
        self.rebuild_count += 1;
        Ok(())
    }
}

impl Default for RegenerationController {
    fn default() -> Self {
        Self::new(Params::default())
    }
}
