use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_files = [
        "proto/envoy/service/accesslog/v2/als.proto",
        "proto/envoy/service/accesslog/v3/als.proto",
    ];

    println!("cargo:rerun-if-changed=proto");

    let descriptor_path = PathBuf::from(std::env::var("OUT_DIR")?).join("als_descriptor.bin");

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        // Sorted map keys keep the JSON rendering deterministic.
        .btree_map(["."])
        .compile_well_known_types(true)
        .extern_path(".google.protobuf", "::pbjson_types")
        .file_descriptor_set_path(&descriptor_path)
        .compile_protos(&proto_files, &["proto"])?;

    // proto3 JSON mapping (camelCase names, defaults omitted, 64-bit ints as
    // strings, enums by name) for every generated package.
    let descriptor_set = std::fs::read(&descriptor_path)?;
    pbjson_build::Builder::new()
        .register_descriptors(&descriptor_set)?
        .btree_map(["."])
        .build(&[".envoy", ".xds"])?;

    Ok(())
}
