use clap::Parser;
use softu2f::keystore::DEFAULT_NAMESPACE;
use softu2f::{FileKeyStore, Helper, HelperConfig, PresencePolicy};
use softu2f_crypto::SoftAttestation;
use softu2f_transport::{NativeMessaging, DEFAULT_MAX_INPUT};

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(about, version)]
struct Args {
    /// Key store directory (default: $HOME/.softu2f)
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Key store namespace
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// Largest accepted request body, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_INPUT)]
    max_input_size: u32,

    /// DER attestation certificate
    #[arg(long)]
    attestation_cert: PathBuf,

    /// Attestation private key (PKCS#8 PEM or DER)
    #[arg(long)]
    attestation_key: PathBuf,

    /// Answer to user presence checks
    #[arg(long, value_enum, default_value_t = PresencePolicy::Accept)]
    presence: PresencePolicy,
}

impl Args {
    fn config(&self) -> HelperConfig {
        let mut builder = HelperConfig::builder()
            .namespace(self.namespace.clone())
            .max_input_size(self.max_input_size)
            .presence(self.presence);
        if let Some(dir) = &self.store_dir {
            builder = builder.store_dir(dir.clone());
        }
        builder.build()
    }
}

fn run(args: &Args) -> softu2f::Result<()> {
    let config = args.config();
    log::debug!("{:?}", config);

    let store =
        FileKeyStore::with_presence(&config.store_dir, &config.namespace, config.presence.callback())?;
    let attestation = SoftAttestation::from_files(&args.attestation_cert, &args.attestation_key)?;
    let helper = Helper::new(store, attestation);

    let mut channel = NativeMessaging::new(io::stdin().lock(), io::stdout().lock())
        .with_max_input(config.max_input_size);
    helper.run(&mut channel)?;
    Ok(())
}

fn main() -> ExitCode {
    pretty_env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
