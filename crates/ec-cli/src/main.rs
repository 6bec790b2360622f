mod server;
mod ticker;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta};
use clap::{Parser, Subcommand};
use ec_config::{Config, config_path, default_base_dir};
use ec_core::{
    ElasticClock, GeoPosition, ResolvedZone, Snapshot, SolarEventOracle, SolarEvents,
    SunriseEquation, SystemClock, WallClock, compute_durations, resolve_zone, stretch_factor,
    stretch_profile,
};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "ec", about = "Elastic day/night clock")]
struct Cli {
    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    /// Latitude in degrees, overriding the configured location
    #[arg(long, global = true, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude in degrees, overriding the configured location
    #[arg(long, global = true, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Use UTC when no timezone is known for the location
    #[arg(long, global = true)]
    assume_utc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show real day and night lengths
    Durations {
        /// Date (YYYY-MM-DD), today by default
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show the real and adjusted time once
    Now {
        /// Instant to evaluate (RFC 3339), now by default
        #[arg(long)]
        at: Option<DateTime<FixedOffset>>,
    },

    /// Show the duration of one adjusted second
    Stretch {
        /// Instant to evaluate (RFC 3339), now by default
        #[arg(long)]
        at: Option<DateTime<FixedOffset>>,
    },

    /// Sample the adjusted-second duration across a day
    Profile {
        /// Date (YYYY-MM-DD), today by default
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Sampling interval in minutes
        #[arg(long, default_value_t = 60)]
        every_minutes: u32,
    },

    /// Run the clock, printing every tick
    Run {
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,

        /// Keep day and night lengths of this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Run the clock and serve snapshots over HTTP at GET /clock
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:7878")]
        bind: String,
    },

    /// Inspect or edit the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Save --lat/--lon as the default location
    SetLocation {
        /// Display name for the location
        #[arg(long)]
        name: Option<String>,

        /// Fixed UTC offset in hours, instead of the nautical zone from longitude
        #[arg(long, allow_negative_numbers = true)]
        utc_offset: Option<f64>,

        /// Timezone label shown with --utc-offset
        #[arg(long, requires = "utc_offset")]
        zone_id: Option<String>,
    },
}

/// Where the clock runs.
struct Site {
    config: Config,
    position: GeoPosition,
    zone: ResolvedZone,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Durations { date } => cmd_durations(&cli, *date),
        Commands::Now { at } => cmd_now(&cli, *at),
        Commands::Stretch { at } => cmd_stretch(&cli, *at),
        Commands::Profile {
            date,
            every_minutes,
        } => cmd_profile(&cli, *date, *every_minutes),
        Commands::Run { ticks, date } => cmd_run(&cli, *ticks, *date).await,
        Commands::Serve { bind } => cmd_serve(&cli, bind).await,
        Commands::Config { action } => cmd_config(&cli, action),
    }
}

fn config_file() -> PathBuf {
    config_path(&default_base_dir())
}

fn load_config() -> Result<Config> {
    let path = config_file();
    Config::load(&path).with_context(|| format!("failed to load config from {}", path.display()))
}

/// Flags win over the config file, which wins over Paris.
fn flag_position(cli: &Cli) -> Result<Option<GeoPosition>> {
    match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => Ok(Some(
            GeoPosition::new(lat, lon).context("invalid --lat/--lon")?,
        )),
        (None, None) => Ok(None),
        _ => bail!("--lat and --lon must be given together"),
    }
}

fn resolve_site(cli: &Cli) -> Result<Site> {
    let config = load_config()?;
    let position = match flag_position(cli)? {
        Some(position) => position,
        None => config.position().context("invalid location in config")?,
    };
    let resolver = config.resolver().context("invalid timezone in config")?;
    let zone = resolve_zone(resolver.as_ref(), position, cli.assume_utc)
        .context("failed to resolve timezone")?;
    tracing::debug!(%position, zone = %zone.id, "site resolved");
    Ok(Site {
        config,
        position,
        zone,
    })
}

impl Site {
    fn now(&self, at: Option<DateTime<FixedOffset>>) -> DateTime<FixedOffset> {
        match at {
            Some(at) => at.with_timezone(&self.zone.offset),
            None => SystemClock.now_in(self.zone.offset),
        }
    }

    fn events(&self, oracle: &SunriseEquation, date: NaiveDate) -> Result<SolarEvents> {
        oracle
            .sunrise_and_sunset(self.position, date, self.zone.offset)
            .with_context(|| format!("no sunrise/sunset at {} on {date}", self.position))
    }

    fn engine(
        &self,
        oracle: &SunriseEquation,
        pinned_date: Option<NaiveDate>,
        now: DateTime<FixedOffset>,
    ) -> Result<ElasticClock> {
        let settings = self.config.settings().context("invalid clock settings")?;
        ElasticClock::start(
            self.position,
            self.zone.clone(),
            settings,
            pinned_date,
            now,
            oracle,
        )
        .context("failed to start the clock")
    }
}

fn print_snapshot(snapshot: &Snapshot) {
    println!("Current time: {}", snapshot.real_time.format("%H:%M:%S"));
    println!("Adjusted time: {}", snapshot.fictitious_time);
    println!("Duration of adjusted second: {:.3}", snapshot.stretch_factor);
    println!("Day duration: {:.2} hours", snapshot.day_hours);
    println!("Night duration: {:.2} hours", snapshot.night_hours);
}

fn cmd_durations(cli: &Cli, date: Option<NaiveDate>) -> Result<()> {
    let site = resolve_site(cli)?;
    let date = date.unwrap_or_else(|| site.now(None).date_naive());
    let durations = compute_durations(date, site.position.latitude());

    println!("Location: {} ({})", site.position, site.zone.id);
    println!("Date: {date}");
    println!("Day duration: {:.2} hours", durations.day_hours);
    println!("Night duration: {:.2} hours", durations.night_hours);
    Ok(())
}

fn cmd_now(cli: &Cli, at: Option<DateTime<FixedOffset>>) -> Result<()> {
    let site = resolve_site(cli)?;
    let oracle = SunriseEquation::new();
    let now = site.now(at);
    let mut engine = site.engine(&oracle, None, now)?;
    let tick = engine.step(now, &oracle).context("failed to read the clock")?;

    println!("Location: {} ({})", site.position, site.zone.id);
    print_snapshot(&tick.snapshot);
    Ok(())
}

fn cmd_stretch(cli: &Cli, at: Option<DateTime<FixedOffset>>) -> Result<()> {
    let site = resolve_site(cli)?;
    let oracle = SunriseEquation::new();
    let now = site.now(at);
    let durations = compute_durations(now.date_naive(), site.position.latitude());
    let events = site.events(&oracle, now.date_naive())?;

    println!(
        "Duration of adjusted second: {:.3}",
        stretch_factor(&now, &durations, &events)
    );
    Ok(())
}

fn cmd_profile(cli: &Cli, date: Option<NaiveDate>, every_minutes: u32) -> Result<()> {
    if every_minutes == 0 {
        bail!("--every-minutes must be at least 1");
    }
    let site = resolve_site(cli)?;
    let oracle = SunriseEquation::new();
    let date = date.unwrap_or_else(|| site.now(None).date_naive());
    let durations = compute_durations(date, site.position.latitude());
    let events = site.events(&oracle, date)?;

    let samples = stretch_profile(
        site.zone.offset,
        &durations,
        &events,
        TimeDelta::minutes(i64::from(every_minutes)),
    );

    println!("Location: {} ({})", site.position, site.zone.id);
    println!(
        "Sunrise: {}  Sunset: {}",
        events.sunrise.format("%H:%M"),
        events.sunset.format("%H:%M")
    );
    for sample in samples {
        let span = match sample.span {
            ec_core::Span::Day => "day",
            ec_core::Span::Night => "night",
            ec_core::Span::Neutral => "neutral",
        };
        println!("{}  {span:<7}  {:.3}", sample.time.format("%H:%M"), sample.stretch);
    }
    Ok(())
}

async fn cmd_run(cli: &Cli, ticks: Option<u64>, date: Option<NaiveDate>) -> Result<()> {
    let site = resolve_site(cli)?;
    let oracle = SunriseEquation::new();
    let clock = SystemClock;
    let mut engine = site.engine(&oracle, date, clock.now_in(site.zone.offset))?;

    let cancel = CancellationToken::new();
    ticker::cancel_on_ctrl_c(cancel.clone());

    let ran = ticker::run_ticks(&mut engine, &clock, &oracle, &cancel, ticks, |snapshot| {
        print_snapshot(snapshot);
        println!();
    })
    .await
    .context("clock stopped with an error")?;
    cancel.cancel();

    tracing::info!(ticks = ran, "run finished");
    Ok(())
}

async fn cmd_serve(cli: &Cli, bind: &str) -> Result<()> {
    let site = resolve_site(cli)?;
    let oracle = SunriseEquation::new();
    let clock = SystemClock;
    let engine = site.engine(&oracle, None, clock.now_in(site.zone.offset))?;

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    let cancel = CancellationToken::new();
    ticker::cancel_on_ctrl_c(cancel.clone());

    let (snapshots, tick_task) = ticker::spawn_ticker(engine, clock, oracle, cancel.clone());
    let served = server::serve(listener, server::build_router(snapshots), cancel.clone()).await;
    cancel.cancel();

    let ran = tick_task
        .await
        .context("tick task panicked")?
        .context("clock stopped with an error")?;
    served.context("snapshot server failed")?;

    tracing::info!(ticks = ran, "server stopped");
    Ok(())
}

fn cmd_config(cli: &Cli, action: &ConfigAction) -> Result<()> {
    let path = config_file();
    match action {
        ConfigAction::Show => {
            let config = load_config()?;
            print!("{}", config.to_toml().context("failed to render config")?);
        }
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::SetLocation {
            name,
            utc_offset,
            zone_id,
        } => {
            let (Some(lat), Some(lon)) = (cli.lat, cli.lon) else {
                bail!("set-location needs both --lat and --lon");
            };
            let mut config = load_config()?;
            config
                .set_location(lat, lon, name.clone())
                .context("invalid location")?;
            if let Some(hours) = *utc_offset {
                let id = zone_id.clone().unwrap_or_else(|| format!("UTC{hours:+}"));
                config
                    .set_timezone(id, hours)
                    .context("invalid --utc-offset/--zone-id")?;
            }
            config
                .save(&path)
                .with_context(|| format!("failed to save config to {}", path.display()))?;
            println!("saved location ({lat}, {lon}) to {}", path.display());
        }
    }
    Ok(())
}
