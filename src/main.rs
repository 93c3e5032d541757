use envcal::cli::run;
use envcal::error::ScheduleError;

/// Failures outside the user's control: I/O on an existing file, broken
/// output pipes and the like
fn is_internal(e: &anyhow::Error) -> bool {
    e.chain().any(|cause| {
        cause.is::<std::io::Error>() || matches!(cause.downcast_ref::<ScheduleError>(), Some(ScheduleError::Io(_)))
    })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    // No-op outside Windows; ignored if the console refuses
    let _ = enable_ansi_support::enable_ansi_support();

    if let Err(e) = run() {
        if is_internal(&e) {
            eprintln!("Internal error: {}", e);
            // Show error chain if available
            let mut source = e.source();
            if source.is_some() {
                eprintln!("\nCaused by:");
                let mut indent = 1;
                while let Some(err) = source {
                    eprintln!("{:indent$}  {}", "", err);
                    source = err.source();
                    indent += 1;
                }
            }
            std::process::exit(2);
        } else {
            // User error
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
