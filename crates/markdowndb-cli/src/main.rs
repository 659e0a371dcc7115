use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use markdowndb_config::Config;
use markdowndb_engine::{
    Catalog, EntityKind, FileStore, Fix, ParseCache, Schema, SchemaSet, ValidationReport,
    parse, try_apply_fix, validate,
};
use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

#[derive(Parser)]
#[command(name = "markdowndb", about = "Job and profile document utilities")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the parsed structure of a document
    Parse(ParseArgs),
    /// Check a document against its schema
    Validate(ValidateArgs),
    /// Apply one of the fixes a validation report offers
    Fix(FixArgs),
    /// Create a new document from a template in the documents directory
    New(NewArgs),
    /// Validate every document in the documents directory
    Check(CheckArgs),
}

#[derive(Args)]
struct ParseArgs {
    /// Path to the document
    file: PathBuf,
    /// Print JSON instead of the debug tree
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ValidateArgs {
    /// Path to the document
    file: PathBuf,
    /// Schema to validate against; defaults to the document's type tag
    #[arg(short, long)]
    kind: Option<EntityKind>,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct FixArgs {
    /// Path to the document
    file: PathBuf,
    /// Number of the fix, as listed by `validate`
    #[arg(short, long)]
    finding: usize,
    /// Value to use when the fix offers several
    #[arg(long)]
    choice: Option<String>,
    /// Cursor byte offset to carry through the edit
    #[arg(long, default_value_t = 0)]
    cursor: usize,
    #[arg(short, long)]
    kind: Option<EntityKind>,
    /// Print the fixed text instead of writing the file
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct NewArgs {
    kind: EntityKind,
    id: String,
    /// Documents directory; defaults to the configured one
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Args)]
struct CheckArgs {
    /// Documents directory; defaults to the configured one
    #[arg(long)]
    dir: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        }
    }
}

/// Runs a command and returns the process exit code.
fn run(cli: Cli) -> Result<i32> {
    let config = load_config(cli.config)?;
    let schemas = load_schemas(config.as_ref())?;

    match cli.command {
        Commands::Parse(args) => run_parse(args),
        Commands::Validate(args) => run_validate(args, &schemas),
        Commands::Fix(args) => run_fix(args, &schemas),
        Commands::New(args) => run_new(args, config.as_ref(), schemas),
        Commands::Check(args) => run_check(args, config.as_ref(), schemas),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Option<Config>> {
    let path = path.unwrap_or_else(Config::config_path);
    log::debug!("Config path: {}", path.display());
    Ok(Config::load_from_path(&path)?)
}

fn load_schemas(config: Option<&Config>) -> Result<SchemaSet> {
    let mut schemas = SchemaSet::default();
    let Some(config) = config else {
        return Ok(schemas);
    };

    let overrides = [
        (EntityKind::Job, &config.schemas.job),
        (EntityKind::Profile, &config.schemas.profile),
    ];
    for (kind, path) in overrides {
        let Some(path) = path else { continue };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {kind} schema at {}", path.display()))?;
        let schema = Schema::from_toml_str(&text)
            .with_context(|| format!("Failed to load {kind} schema at {}", path.display()))?;
        log::info!("Using {kind} schema from {}", path.display());
        schemas.set(kind, schema);
    }
    Ok(schemas)
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn documents_dir(dir: Option<PathBuf>, config: Option<&Config>) -> Result<PathBuf> {
    if let Some(dir) = dir {
        return Ok(dir);
    }
    match config {
        Some(config) => Ok(config.documents_path.clone()),
        None => bail!(
            "No documents directory given and no config file found at {}",
            Config::config_path().display()
        ),
    }
}

/// Explicit kind, else the document's own tag, else job.
fn report_for(text: &str, kind: Option<EntityKind>, schemas: &SchemaSet) -> ValidationReport {
    let doc = parse(text);
    let kind = kind
        .or_else(|| EntityKind::detect(&doc))
        .unwrap_or(EntityKind::Job);
    validate(&doc, schemas.get(kind))
}

fn run_parse(args: ParseArgs) -> Result<i32> {
    let doc = parse(&read_document(&args.file)?);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("{doc:#?}");
    }
    Ok(0)
}

fn run_validate(args: ValidateArgs, schemas: &SchemaSet) -> Result<i32> {
    let report = report_for(&read_document(&args.file)?, args.kind, schemas);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&args.file.display().to_string(), &report);
    }
    Ok(if report.valid { 0 } else { 1 })
}

fn print_report(name: &str, report: &ValidationReport) {
    let status = if report.valid { "valid" } else { "invalid" };
    println!("{name}: {status}");

    for finding in report.findings() {
        let subject = finding.field_or_section.as_deref().unwrap_or("-");
        println!(
            "  {:?}[{}] {subject}: {}",
            finding.severity(),
            finding.kind,
            finding.message
        );
    }

    for (n, (_, fix)) in report.fixes().enumerate() {
        println!("  fix {}: {}", n + 1, fix.describe());
    }
}

fn run_fix(args: FixArgs, schemas: &SchemaSet) -> Result<i32> {
    let text = read_document(&args.file)?;
    let report = report_for(&text, args.kind, schemas);

    let Some((_, fix)) = args
        .finding
        .checked_sub(1)
        .and_then(|n| report.fixes().nth(n))
    else {
        bail!(
            "No fix number {}; the document has {} fix(es)",
            args.finding,
            report.fixes().count()
        );
    };

    let fix = resolve_choice(fix, args.choice.as_deref())?;
    let patch = try_apply_fix(&text, &fix, args.cursor)?;

    if args.dry_run {
        print!("{}", patch.text);
    } else {
        fs::write(&args.file, &patch.text)
            .with_context(|| format!("Failed to write {}", args.file.display()))?;
        log::info!("{}: {}", args.file.display(), fix.describe());
    }
    println!("cursor: {}", patch.cursor);
    Ok(0)
}

fn resolve_choice(fix: &Fix, choice: Option<&str>) -> Result<Fix> {
    match (fix, choice) {
        (Fix::ReplaceEnumValueMulti { allowed_values, .. }, None) => bail!(
            "This fix needs --choice, one of: {}",
            allowed_values.join(", ")
        ),
        (Fix::ReplaceEnumValueMulti { allowed_values, .. }, Some(value)) => {
            fix.choose(value).with_context(|| {
                format!(
                    "{value:?} is not an allowed value; expected one of: {}",
                    allowed_values.join(", ")
                )
            })
        }
        (other, _) => Ok(other.clone()),
    }
}

fn run_new(args: NewArgs, config: Option<&Config>, schemas: SchemaSet) -> Result<i32> {
    let dir = documents_dir(args.dir, config)?;
    let store = FileStore::create(&dir)?;
    let path = store.path_for(&args.id)?;
    let mut catalog = Catalog::open(store)?.with_schemas(schemas);

    if catalog.contains(&args.id) {
        bail!("{} already exists", path.display());
    }
    catalog.create(args.kind, &args.id)?;
    println!("{}", path.display());
    Ok(0)
}

fn run_check(args: CheckArgs, config: Option<&Config>, schemas: SchemaSet) -> Result<i32> {
    let dir = documents_dir(args.dir, config)?;
    let cache = match config {
        Some(config) => ParseCache::with_fingerprint_len(config.cache.fingerprint_len),
        None => ParseCache::new(),
    };
    let mut catalog = Catalog::with_cache(FileStore::open(&dir)?, cache)?.with_schemas(schemas);

    let ids: Vec<String> = catalog.ids().map(str::to_string).collect();
    let mut invalid = 0;
    for id in &ids {
        let report = catalog.validate(id, None)?;
        if !report.valid {
            invalid += 1;
        }
        print_report(id, &report);
    }

    let stats = catalog.cache_stats();
    log::info!(
        "Checked {} document(s); cache hits {}, misses {}, invalidations {}",
        ids.len(),
        stats.hits,
        stats.misses,
        stats.invalidations
    );
    println!("{} of {} document(s) invalid", invalid, ids.len());
    Ok(if invalid == 0 { 0 } else { 1 })
}
