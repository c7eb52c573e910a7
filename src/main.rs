use taskbuddy::cli::{exit_code, is_user_error, run};

fn main() {
    if let Err(e) = run() {
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            eprint!("{}", clap_err);
            std::process::exit(exit_code(&e));
        }

        if is_user_error(&e) {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("Internal error: {}", e);
            // Show error chain if available
            let mut causes = e.chain().skip(1).peekable();
            if causes.peek().is_some() {
                eprintln!("\nCaused by:");
                for (indent, cause) in causes.enumerate() {
                    eprintln!("{:indent$}  {}", "", cause, indent = indent + 1);
                }
            }
        }
        std::process::exit(exit_code(&e));
    }
}
