fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/pricing_optimizer.proto");

    // Protobuf code is only needed by the gRPC server and the demo client
    if std::env::var_os("CARGO_FEATURE_SERVER").is_some() {
        tonic_build::compile_protos("proto/pricing_optimizer.proto")?;
    }

    Ok(())
}
