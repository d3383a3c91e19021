//! De generatiepijplijn: parameters, per-feature assemblage, wereld,
//! regeneratie en export.

pub mod assembler;
pub mod controller;
pub mod export;
pub mod orchestrator;
pub mod params;
pub mod world;

pub use assembler::{FeatureError, RefinedMesh, assemble_feature};
pub use controller::{ControllerError, ControllerState, RegenerationController, WorldSink};
pub use export::{ExportDocument, GENERATOR, export_world, export_world_with_generator};
pub use orchestrator::{GenerateError, Toolkit, generate};
pub use params::{
    ControlKind, ControlSpec, MAX_LOOP, MaterialMode, MeshMaterial, ParamError, ParamValue, Params,
};
pub use world::{SkippedFeature, World};
