// Synthesis phases, applied in file order
//
// Later phases read state written by earlier ones: the license phase sets the unit test
// gate used by the language phase, and every aggregating job depends on the jobs
// inserted before it.

#[path = "01_defaults.rs"]
pub mod defaults;
#[path = "02_variables.rs"]
pub mod variables;
#[path = "03_linters.rs"]
pub mod linters;
#[path = "04_licenses.rs"]
pub mod licenses;
#[path = "05_languages.rs"]
pub mod languages;
#[path = "06_code_deploy.rs"]
pub mod code_deploy;
#[path = "07_aws.rs"]
pub mod aws;
#[path = "08_publish_status.rs"]
pub mod publish_status;
#[path = "09_validate.rs"]
pub mod validate;
#[path = "10_status_checks.rs"]
pub mod status_checks;
