mod test_mesh_uv;
mod test_subdivision_basic;
