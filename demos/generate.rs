use std::path::Path;

use certify::error::CertifyError;
use certify::request::{RequestForm, SubjectField, config, generate};
use certify::toolkit::NativeToolkit;

fn main() -> Result<(), CertifyError> {
    let mut form = RequestForm::new();
    form.set_field(SubjectField::CommonName, "*.example.com");
    form.set_field(SubjectField::Organization, "Example Corp");
    form.set_field(SubjectField::Country, "US");
    form.add_san("example.com");
    form.add_san("www.example.com");
    form.set_password("correct horse battery staple");

    // What an interactive front end would show as the live preview.
    println!("{}", config::render_config(&form.snapshot()));

    // 4096-bit key generation; expect this to take a moment.
    let artifact = generate::generate(&form.snapshot(), Path::new("."), &NativeToolkit::new())?;

    for path in artifact.produced_paths() {
        println!("produced: {}", path.display());
    }
    Ok(())
}
