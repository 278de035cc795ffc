// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runtime configuration loaded from environment variables.

use image::Rgb;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Number of worker threads for view synthesis.
    pub worker_threads: usize,
    /// Directory rendered images are written to.
    pub output_dir: PathBuf,
    /// Gray level of camera pixels that see no floor.
    pub background: u8,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            worker_threads: std::env::var("CCTV_WORKER_THREADS")
                .unwrap_or_else(|_| num_cpus::get().to_string())
                .parse()
                .unwrap_or_else(|_| num_cpus::get()),
            output_dir: std::env::var("CCTV_OUTPUT_DIR")
                .unwrap_or_else(|_| "./out".into())
                .into(),
            background: std::env::var("CCTV_BACKGROUND")
                .unwrap_or_else(|_| "255".into())
                .parse()
                .unwrap_or(255),
        }
    }

    pub fn background_color(&self) -> Rgb<u8> {
        Rgb([self.background; 3])
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
