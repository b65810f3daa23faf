/*
 * Responsibility
 * - Config 読み込み → TokenConverter 組み立て (ClaimNormalizer の登録はここで一度だけ)
 * - 入力 (claim JSON / JWT) を読み、AuthenticationResult を JSON で出力
 */
use std::io::Read;
use std::sync::Arc;
use std::{fs, panic, process};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use claims_normalizer::config::Config;
use claims_normalizer::token;
use claims_normalizer::{ClaimNormalizer, ClaimSet, DefaultExtractor, TokenConverter, TokenConverterConfigurer};

use crate::cli::Args;

fn init_tracing() {
    // Prefer RUST_LOG if set. stdout is reserved for the result.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: fail fast.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub fn run() -> Result<()> {
    let args = Args::parse();

    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    let converter = build_converter(&config);

    let claims = read_claims(&args)?;
    let authentication = converter
        .extract_authentication(&claims)
        .context("token rejected")?;

    let output = if args.compact {
        serde_json::to_string(&authentication)?
    } else {
        serde_json::to_string_pretty(&authentication)?
    };
    println!("{output}");

    Ok(())
}

fn build_converter(config: &Config) -> TokenConverter {
    let baseline = Arc::new(DefaultExtractor::new(config.extractor.clone()));

    let mut converter = TokenConverter::with_extractor(baseline.clone());
    ClaimNormalizer::new(baseline).configure(&mut converter);

    converter
}

fn read_claims(args: &Args) -> Result<ClaimSet> {
    let input = match &args.input {
        Some(path) if !args.reads_stdin() => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    if args.jwt {
        return token::decode_claims(&input).context("invalid token");
    }

    input.parse::<ClaimSet>().context("invalid claim set")
}
