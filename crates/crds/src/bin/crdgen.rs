//! Print the metalops CRD manifests as YAML.
//!
//! Usage: `cargo run --bin crdgen > manifests/crds.yaml`

use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    print!("{}", serde_yaml::to_string(&crds::Workflow::crd())?);
    println!("---");
    print!("{}", serde_yaml::to_string(&crds::BmcJob::crd())?);
    println!("---");
    print!("{}", serde_yaml::to_string(&crds::Hardware::crd())?);
    Ok(())
}
