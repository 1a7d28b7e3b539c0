use gitea_provision::gitea_provision_main;
use std::process::exit;

#[tokio::main]
async fn main() {
    match gitea_provision_main().await {
        Ok(_) => {
            exit(0);
        }
        Err(e) => {
            eprintln!("{e}");
            exit(1);
        }
    };
}
