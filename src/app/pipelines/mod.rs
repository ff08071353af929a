pub mod datapack_pipeline;
