use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

use crate::metric::DEFAULT_METRICS_CAPACITY;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub db_path: String,
    pub metrics_csv: Option<PathBuf>,
    pub metrics_capacity: usize,
    pub static_dir: PathBuf,
    pub seed: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = env::var("DEMO_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        Ok(Config {
            bind_addr: bind_addr
                .parse()
                .with_context(|| format!("invalid DEMO_BIND_ADDR: {bind_addr}"))?,
            db_path: env::var("DEMO_DB_PATH").unwrap_or_else(|_| "db.sqlite".to_string()),
            metrics_csv: env::var("DEMO_METRICS_CSV").ok().map(PathBuf::from),
            metrics_capacity: match env::var("DEMO_METRICS_CAPACITY") {
                Ok(v) => v
                    .parse()
                    .with_context(|| format!("invalid DEMO_METRICS_CAPACITY: {v}"))?,
                Err(_) => DEFAULT_METRICS_CAPACITY,
            },
            static_dir: env::var("DEMO_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("../static")),
            seed: env::var("DEMO_SEED")
                .map(|v| !matches!(v.as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
        })
    }
}
