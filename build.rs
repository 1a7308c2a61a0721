//! Build timestamp and target triple for `docsearch-assist --version`.

use vergen::{BuildBuilder, CargoBuilder, Emitter};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let mut emitter = Emitter::default();
    if let Ok(build) = BuildBuilder::default().build_timestamp(true).build() {
        let _ = emitter.add_instructions(&build);
    }
    if let Ok(cargo) = CargoBuilder::default().target_triple(true).build() {
        let _ = emitter.add_instructions(&cargo);
    }

    // Without the metadata the long version is just the crate version.
    if let Err(e) = emitter.emit() {
        println!("cargo:warning=version metadata unavailable: {e}");
    }
}
