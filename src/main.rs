fn main() {
    if let Err(err) = survey_prep::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
