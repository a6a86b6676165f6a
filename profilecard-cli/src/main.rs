#![deny(missing_docs)]
//! profilecard command-line interface.
//!
//! Generates GitHub profile badges (stats and language usage) and keeps the
//! README references to them fresh.

mod gate;
mod github;

use chrono::Utc;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use github::{DEFAULT_API_URL, ReqwestGitHubClient};
use log::{error, info, warn};
use profilecard_core::config::{
    DEFAULT_COMMIT_BASELINE, DEFAULT_CONCURRENCY, DEFAULT_PER_PAGE,
};
use profilecard_core::{
    FileSystem, LanguageStrategy, PipelineConfig, SnapshotStore, StdFileSystem, publish_readme,
    render_languages_svg, render_stats_svg, run_profile, synthetic_stats,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const STATS_SVG: &str = "stats.svg";
const LANGUAGES_SVG: &str = "languages.svg";
const NAME_HINT_DENSITY: f64 = 0.1;

#[derive(Parser)]
#[command(name = "profilecard", version, about = "GitHub profile badge generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
struct ProfileArgs {
    /// GitHub login to profile.
    #[arg(long, env = "GITHUB_USER")]
    user: String,
    /// Verified commit count the reported total never drops below.
    #[arg(long, env = "COMMIT_BASELINE", default_value_t = DEFAULT_COMMIT_BASELINE)]
    commit_baseline: u64,
    /// Directory holding the badges and their caches.
    #[arg(long, default_value = "docs")]
    output_dir: PathBuf,
}

#[derive(Args, Clone, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    profile: ProfileArgs,
    /// GitHub token used for API requests.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Base URL of the GitHub API.
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    /// README whose badge links are cache-busted.
    #[arg(long, default_value = "README.md")]
    readme: PathBuf,
    /// Language aggregation strategy.
    #[arg(long, value_enum, default_value_t = StrategyArg::Diversity)]
    strategy: StrategyArg,
    /// Whether forked repositories count towards the language mix.
    #[arg(
        long,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    include_forks: bool,
    /// Disable priority-language hints taken from repository names.
    #[arg(long)]
    no_name_hints: bool,
    /// Maximum number of concurrent language requests.
    #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,
    /// Repositories requested per listing page.
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    per_page: u32,
    /// CI event that triggered the run.
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    event_name: Option<String>,
    /// Local hours at which scheduled runs proceed (comma-separated).
    #[arg(long, value_delimiter = ',')]
    run_hours: Vec<u32>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum StrategyArg {
    /// Average per-repository language shares.
    Diversity,
    /// Sum raw byte counts of non-fork repositories.
    Raw,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch live data and write both badges.
    Generate(GenerateArgs),
    /// Print the grade of the cached stats snapshot.
    Grade(ProfileArgs),
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    execute(cli.command).await
}

#[cfg(test)]
fn main() {}

async fn execute(command: Commands) -> CliResult<()> {
    let result = match command {
        Commands::Generate(args) => {
            let local_hour = gate::local_hour().await;
            run_generate(args, local_hour).await
        }
        Commands::Grade(args) => run_grade(&args).map(|summary| println!("{summary}")),
    };
    if let Err(err) = &result {
        error!("profilecard failed: {err}");
    }
    result
}

fn build_config(args: &GenerateArgs) -> CliResult<PipelineConfig> {
    let mut config = PipelineConfig::new(args.profile.user.trim());
    config.baseline_commits = args.profile.commit_baseline;
    config.per_page = args.per_page;
    config.concurrency = args.concurrency;
    config.language_strategy = match args.strategy {
        StrategyArg::Raw => LanguageStrategy::RawBytes,
        StrategyArg::Diversity => LanguageStrategy::DiversityWeighted {
            include_forks: args.include_forks,
            name_hint_density: (!args.no_name_hints).then_some(NAME_HINT_DENSITY),
        },
    };
    config.validate()?;
    Ok(config)
}

async fn run_generate(args: GenerateArgs, local_hour: u32) -> CliResult<()> {
    let config = build_config(&args)?;
    if !gate::should_run(args.event_name.as_deref(), &args.run_hours, local_hour) {
        info!("scheduled run skipped at local hour {local_hour}");
        return Ok(());
    }

    let client = Arc::new(ReqwestGitHubClient::new(&args.api_url, args.token.clone())?);
    let output_dir = args.profile.output_dir.as_path();
    let store = SnapshotStore::new(StdFileSystem::new(), output_dir);
    let run = run_profile(client, &config, &store).await;

    let grade = run.grade(&config);
    let visible = run.visible_languages(&config);
    let fs = StdFileSystem::new();
    let stats_path = output_dir.join(STATS_SVG);
    let languages_path = output_dir.join(LANGUAGES_SVG);
    fs.write_atomic(
        &stats_path,
        &render_stats_svg(&config.username, &run.stats.value, &grade),
    )?;
    fs.write_atomic(
        &languages_path,
        &render_languages_svg(&config.username, &visible),
    )?;
    info!(
        "wrote {} ({}, grade {}) and {} ({}, {} languages)",
        stats_path.display(),
        run.stats.origin.as_str(),
        grade.grade,
        languages_path.display(),
        run.languages.origin.as_str(),
        visible.len()
    );

    let assets = [asset_reference(&stats_path), asset_reference(&languages_path)];
    let assets: Vec<&str> = assets.iter().map(String::as_str).collect();
    let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
    match publish_readme(&fs, &args.readme, &assets, now) {
        Ok(Some(stamp)) => info!("README cache stamp {stamp}"),
        Ok(None) => info!("no README at {}, skipping publish", args.readme.display()),
        Err(err) => warn!("failed to update {}: {err}", args.readme.display()),
    }
    Ok(())
}

fn run_grade(args: &ProfileArgs) -> CliResult<String> {
    let store = SnapshotStore::new(StdFileSystem::new(), &args.output_dir);
    let snapshot = match store.load_stats() {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            warn!("no stats cache at {}", store.stats_path().display());
            synthetic_stats(args.commit_baseline)
        }
        Err(err) => {
            warn!("stats cache unreadable: {err}");
            synthetic_stats(args.commit_baseline)
        }
    };
    let config = PipelineConfig::new(args.user.trim());
    config.validate()?;
    let grade = config.grading.grade(&snapshot);
    let score = config.grading.score(&snapshot);
    Ok(format!(
        "{}: {} (top {}%, score {score:.0})",
        config.username,
        grade.grade,
        100 - u32::from(grade.percentile.min(100))
    ))
}

fn asset_reference(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::GET;
    use httpmock::MockServer;

    fn parse_generate(extra: &[&str]) -> GenerateArgs {
        let mut argv = vec!["profilecard", "generate", "--user", "octo"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).expect("parse").command {
            Commands::Generate(args) => args,
            Commands::Grade(_) => panic!("expected generate"),
        }
    }

    #[test]
    fn generate_defaults_build_a_valid_config() {
        let args = parse_generate(&[]);
        assert_eq!(args.per_page, 100);
        assert_eq!(args.profile.output_dir, PathBuf::from("docs"));

        let config = build_config(&args).expect("config");
        assert_eq!(config.username, "octo");
        assert_eq!(
            config.language_strategy,
            LanguageStrategy::DiversityWeighted {
                include_forks: true,
                name_hint_density: Some(NAME_HINT_DENSITY),
            }
        );
    }

    #[test]
    fn generate_flags_shape_the_strategy() {
        let args = parse_generate(&["--include-forks", "false", "--no-name-hints"]);
        let config = build_config(&args).expect("config");
        assert_eq!(
            config.language_strategy,
            LanguageStrategy::DiversityWeighted {
                include_forks: false,
                name_hint_density: None,
            }
        );

        let args = parse_generate(&["--include-forks=false"]);
        assert!(!args.include_forks);
        let args = parse_generate(&["--include-forks", "--no-name-hints"]);
        assert!(args.include_forks);
        assert!(args.no_name_hints);

        let args = parse_generate(&["--strategy", "raw", "--run-hours", "0,12"]);
        assert_eq!(args.run_hours, vec![0, 12]);
        let config = build_config(&args).expect("config");
        assert_eq!(config.language_strategy, LanguageStrategy::RawBytes);
    }

    #[test]
    fn invalid_limits_are_rejected() {
        let args = parse_generate(&["--per-page", "0"]);
        assert!(build_config(&args).is_err());
    }

    #[tokio::test]
    async fn execute_reports_command_failures() {
        let args = parse_generate(&["--per-page", "0"]);
        let err = execute(Commands::Generate(args)).await.unwrap_err();
        assert!(err.to_string().contains("per_page"), "{err}");

        let grade = ProfileArgs {
            user: "  ".to_string(),
            commit_baseline: DEFAULT_COMMIT_BASELINE,
            output_dir: std::env::temp_dir().join(unique_dir_name()),
        };
        assert!(execute(Commands::Grade(grade)).await.is_err());
    }

    #[test]
    fn grade_reads_the_cached_snapshot() {
        let root = std::env::temp_dir().join(unique_dir_name());
        std::fs::create_dir_all(&root).expect("create dir");
        std::fs::write(
            root.join("stats_cache.json"),
            r#"{"stars": 500, "commits": "10k+", "prs": 20, "issues": 5, "contribs": 3}"#,
        )
        .expect("write cache");
        let args = ProfileArgs {
            user: "octo".to_string(),
            commit_baseline: 17_000,
            output_dir: root.clone(),
        };

        let summary = run_grade(&args).expect("grade");

        assert_eq!(summary, "octo: A+ (top 5%, score 21325)");
        cleanup_dir(&root);
    }

    #[test]
    fn grade_without_cache_uses_synthetic_stats() {
        let args = ProfileArgs {
            user: "octo".to_string(),
            commit_baseline: 1_000,
            output_dir: std::env::temp_dir().join(unique_dir_name()),
        };
        let summary = run_grade(&args).expect("grade");
        assert_eq!(summary, "octo: B- (top 55%, score 1500)");
    }

    #[tokio::test]
    async fn generate_writes_badges_caches_and_readme() {
        let server = MockServer::start_async().await;
        let languages_url = server.url("/repos/octo/demo/languages");
        server
            .mock_async(|when, then| {
                when.method(GET).path("/users/octo/repos");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!([{
                        "name": "demo",
                        "owner": {"login": "octo"},
                        "stargazers_count": 12,
                        "open_issues_count": 1,
                        "fork": false,
                        "languages_url": languages_url
                    }]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/octo/demo/languages");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"Rust": 750, "R": 250}"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search/issues");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"total_count": 4, "items": [{"repository_url": "https://api.github.com/repos/rust-lang/rust"}]}"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search/commits");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"total_count": 250}"#);
            })
            .await;

        let root = std::env::temp_dir().join(unique_dir_name());
        let output_dir = root.join("docs");
        let readme = root.join("README.md");
        std::fs::create_dir_all(&root).expect("create dir");
        let stats_ref = asset_reference(&output_dir.join(STATS_SVG));
        std::fs::write(&readme, format!("![stats]({stats_ref}?t=1)\n")).expect("write readme");

        let output_arg = output_dir.to_string_lossy().to_string();
        let readme_arg = readme.to_string_lossy().to_string();
        let api_arg = server.base_url();
        let args = parse_generate(&[
            "--output-dir",
            &output_arg,
            "--readme",
            &readme_arg,
            "--api-url",
            &api_arg,
            "--commit-baseline",
            "1000",
        ]);

        run_generate(args, 3).await.expect("generate");

        let stats_svg = std::fs::read_to_string(output_dir.join(STATS_SVG)).expect("stats svg");
        assert!(stats_svg.contains(r#"class="stat">12</text>"#));
        assert!(stats_svg.contains(r#"class="stat">1.3k+</text>"#));
        let languages_svg =
            std::fs::read_to_string(output_dir.join(LANGUAGES_SVG)).expect("languages svg");
        assert!(languages_svg.contains(r#"class="perc">75.0%</text>"#));
        assert!(output_dir.join("stats_cache.json").is_file());
        assert!(output_dir.join("languages_cache.json").is_file());

        let readme_contents = std::fs::read_to_string(&readme).expect("readme");
        assert!(!readme_contents.contains("?t=1)"));
        assert!(readme_contents.starts_with(&format!("![stats]({stats_ref}?t=")));

        cleanup_dir(&root);
    }

    #[tokio::test]
    async fn scheduled_run_outside_the_window_is_skipped() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let output_arg = root.to_string_lossy().to_string();
        let args = parse_generate(&[
            "--output-dir",
            &output_arg,
            "--event-name",
            "schedule",
            "--run-hours",
            "0,12",
            "--api-url",
            "http://127.0.0.1:9",
        ]);

        run_generate(args, 7).await.expect("skip");

        assert!(!root.exists());
    }

    fn unique_dir_name() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        PathBuf::from(format!("profilecard_cli_test_{nanos}"))
    }

    fn cleanup_dir(root: &Path) {
        std::fs::remove_dir_all(root).expect("cleanup temp dir");
    }
}
