use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "portfolio-site", version, about = "Portfolio and blog site")]
pub struct Cli {
    /// Directory holding `site.toml`, the templates, `posts/` and `static/`
    #[arg(long, env = "CONTENT_DIR", default_value = "content", global = true)]
    pub content_dir: PathBuf,

    /// `development` enables hot reload
    #[arg(long = "env", env = "RUST_ENV", default_value = "production", global = true)]
    pub environment: String,

    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED), global = true)]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 8080, global = true)]
    pub port: u16,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve pages over HTTP (default)
    Serve,
    /// Render every route to static HTML files
    Export {
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            content_dir: self.content_dir.clone(),
            is_development: self.environment == "development",
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Where the site's files live and which mode it runs in.
#[derive(Debug, Clone)]
pub struct Config {
    pub content_dir: PathBuf,
    pub is_development: bool,
}

impl Config {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            is_development: false,
        }
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.content_dir.join("posts")
    }

    pub fn site_file(&self) -> PathBuf {
        self.content_dir.join("site.toml")
    }

    pub fn layout_file(&self) -> PathBuf {
        self.content_dir.join("layout.html")
    }

    pub fn not_found_file(&self) -> PathBuf {
        self.content_dir.join("not_found.html")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.content_dir.join("static")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["portfolio-site", "--port", "3000"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.addr().port(), 3000);
    }

    #[test]
    fn serve_accepts_address_flags_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "portfolio-site",
            "serve",
            "--port",
            "3000",
            "--host",
            "127.0.0.1",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::Serve)));
        assert_eq!(cli.addr(), "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn export_takes_an_output_directory() {
        let cli = Cli::try_parse_from([
            "portfolio-site",
            "export",
            "--out-dir",
            "public",
            "--content-dir",
            "site",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Export { ref out_dir }) => assert_eq!(out_dir, Path::new("public")),
            ref other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.config().posts_dir(), Path::new("site/posts"));
    }

    #[test]
    fn development_mode_comes_from_env_flag() {
        let cli = Cli::try_parse_from(["portfolio-site", "--env", "development"]).unwrap();
        assert!(cli.config().is_development);
    }
}
