use clap::Parser;
use log::{error, info};

use httpd::middleware::LogLayer;
use httpd::service::ServiceBuilder;
use httpd::{Args, Server, StaticFiles, logger};

fn main() {
    let args = Args::parse();

    if let Err(e) = logger::init_logger(args.log_level, args.log_file.as_deref()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> httpd::Result<()> {
    let config = args.into_config()?;

    info!("Document root: {}", config.root.display());
    info!(
        "Workers: {}, backlog: {}, receive buffer: {} bytes, index: {}",
        config.workers, config.backlog, config.buffer_size, config.index
    );

    let service = ServiceBuilder::new(StaticFiles::from_config(&config))
        .layer(LogLayer)
        .build();

    let server = Server::bind(&config, service)?;
    info!("Server listening on {}", server.local_addr());

    server.run()
}
