//! Renormind Android CLI
//!
//! Build-configuration tooling for the Renormind Android target: validates
//! and resolves the declarative build descriptor, emits directives for the
//! Gradle pipeline, and drives builds with the resolved configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use renormind_cli::output::{format_count, format_duration, Status};
use renormind_cli::progress;
use renormind_core::error::exit_codes;
use renormind_core::health::{HealthChecker, HealthStatus};
use renormind_resolver::emit;
use renormind_resolver::provider::{
    default_properties_path, FlutterProperties, InjectedValues, StaticProvider, VersionProvider,
};
use renormind_resolver::resolve::{resolve, Resolution};
use renormind_resolver::LoadedDescriptor;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "renormind-android")]
#[command(about = "Build configuration tooling for Renormind Android")]
#[command(version)]
struct Cli {
    /// Descriptor file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Flutter properties file supplying injected versions
    #[arg(long, global = true)]
    flutter_properties: Option<PathBuf>,

    /// Android project directory
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the build descriptor
    Validate,

    /// Resolve the descriptor and emit build directives
    Resolve {
        /// Output directory for resolution artifacts
        #[arg(long, default_value = "build/renormind")]
        out_dir: PathBuf,
    },

    /// Show the resolved build configuration
    Inspect {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the app through Gradle with the resolved configuration
    Build {
        /// Build type to assemble
        #[arg(long, default_value = "debug")]
        build_type: String,
        /// Build bundle (AAB) instead of APK
        #[arg(long)]
        bundle: bool,
        /// Clean before building
        #[arg(long)]
        clean: bool,
    },

    /// Diagnose environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let exit_code = match &cli.command {
        Commands::Validate => run_validate(&cli),
        Commands::Resolve { out_dir } => run_resolve(&cli, out_dir),
        Commands::Inspect { json } => run_inspect(&cli, *json),
        Commands::Build {
            build_type,
            bundle,
            clean,
        } => run_build(&cli, build_type, *bundle, *clean),
        Commands::Doctor { json } => run_doctor(&cli, *json),
    };

    std::process::exit(exit_code);
}

/// Map an error onto the CLI exit-code contract
fn exit_code_for(error: &renormind_core::Error) -> i32 {
    match error.code.category() {
        "Descriptor" => exit_codes::DESCRIPTOR_ERROR,
        "Provider" => exit_codes::PROVIDER_ERROR,
        "Validation" | "Resolution" => exit_codes::VALIDATION_ERROR,
        "Platform" => exit_codes::GRADLE_ERROR,
        _ => exit_codes::FAILURE,
    }
}

/// Build the version provider from CLI flags and standard locations
fn provider_for(cli: &Cli) -> Box<dyn VersionProvider> {
    if let Some(path) = &cli.flutter_properties {
        return Box::new(FlutterProperties::new(path.clone()));
    }
    let default_path = default_properties_path(&cli.project_dir);
    if default_path.exists() {
        return Box::new(FlutterProperties::new(default_path));
    }
    Box::new(StaticProvider(InjectedValues::default()))
}

fn resolve_for(cli: &Cli) -> renormind_core::Result<Resolution> {
    let loaded = LoadedDescriptor::load(cli.config.as_deref())?;
    resolve(&loaded.descriptor, provider_for(cli).as_ref())
}

fn run_validate(cli: &Cli) -> i32 {
    let loaded = match LoadedDescriptor::load(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            Status::error(&e.to_string());
            return exit_code_for(&e);
        }
    };

    if !cli.quiet {
        match &loaded.path {
            Some(path) => Status::info(&format!("Validating {}", path.display())),
            None => Status::info("Validating built-in descriptor defaults"),
        }
    }

    let injected = match provider_for(cli).inject() {
        Ok(injected) => injected,
        Err(e) => {
            Status::error(&e.to_string());
            return exit_code_for(&e);
        }
    };

    let versions =
        match renormind_resolver::resolve::effective_versions(&loaded.descriptor, &injected) {
            Ok(versions) => versions,
            Err(e) => {
                Status::error(&e.to_string());
                return exit_code_for(&e);
            }
        };

    let result = renormind_resolver::validate::validate(&loaded.descriptor, &versions);

    for warning in result.warnings() {
        Status::warning(&warning.to_string());
    }

    if result.is_valid() {
        Status::success("Descriptor is valid");
        exit_codes::SUCCESS
    } else {
        for error in result.errors() {
            Status::error(&error.to_string());
        }
        Status::error(&format_count(result.errors().len(), "error", "errors"));
        exit_codes::VALIDATION_ERROR
    }
}

fn run_resolve(cli: &Cli, out_dir: &Path) -> i32 {
    let resolution = match resolve_for(cli) {
        Ok(resolution) => resolution,
        Err(e) => {
            Status::error(&e.to_string());
            return exit_code_for(&e);
        }
    };

    for warning in &resolution.warnings {
        Status::warning(&warning.to_string());
    }

    match emit::write_artifacts(&resolution.build, out_dir) {
        Ok(artifacts) => {
            if !cli.quiet {
                Status::success("Resolved build configuration");
                Status::detail("manifest", &artifacts.resolved_json.display().to_string());
                Status::detail("directives", &artifacts.directives.display().to_string());
                if let Ok(digest) = resolution.build.digest() {
                    Status::detail("digest", &digest);
                }
            }
            exit_codes::SUCCESS
        }
        Err(e) => {
            Status::error(&e.to_string());
            exit_codes::FAILURE
        }
    }
}

fn run_inspect(cli: &Cli, json: bool) -> i32 {
    let resolution = match resolve_for(cli) {
        Ok(resolution) => resolution,
        Err(e) => {
            Status::error(&e.to_string());
            return exit_code_for(&e);
        }
    };
    let build = &resolution.build;

    if json {
        match build.canonical_json() {
            Ok(rendered) => {
                print!("{}", rendered);
                return exit_codes::SUCCESS;
            }
            Err(e) => {
                Status::error(&e.to_string());
                return exit_codes::FAILURE;
            }
        }
    }

    Status::header("Application");
    Status::detail("applicationId", &build.manifest.application_id);
    Status::detail("namespace", &build.manifest.namespace);
    Status::detail(
        "version",
        &format!(
            "{} ({})",
            build.manifest.version_name, build.manifest.version_code
        ),
    );

    Status::header("SDK");
    Status::detail("compileSdk", &build.compiler.compile_sdk.to_string());
    Status::detail("targetSdk", &build.manifest.target_sdk.to_string());
    Status::detail("minSdk", &build.manifest.min_sdk.to_string());
    if let Some(ndk) = &build.compiler.ndk_version {
        Status::detail("ndkVersion", ndk);
    }
    Status::detail("jvmTarget", &build.compiler.jvm_target);
    Status::detail(
        "coreLibraryDesugaring",
        &build.compiler.core_library_desugaring.to_string(),
    );

    Status::header("Plugins");
    for plugin in &build.plugins {
        println!("  {}", plugin);
    }

    Status::header("Dependencies");
    for request in &build.dependency_requests {
        println!(
            "  {} {}:{}",
            request.scope.as_str(),
            request.coordinate,
            request.version
        );
    }

    Status::header("Signing");
    for (build_type, signing) in &build.signing {
        let suffix = if signing.debug_fallback {
            " (debug fallback)"
        } else {
            ""
        };
        Status::detail(build_type, &format!("{}{}", signing.config, suffix));
    }

    for warning in &resolution.warnings {
        Status::warning(&warning.to_string());
    }

    exit_codes::SUCCESS
}

fn run_build(cli: &Cli, build_type: &str, bundle: bool, clean: bool) -> i32 {
    use renormind_android::gradle;

    let resolution = match resolve_for(cli) {
        Ok(resolution) => resolution,
        Err(e) => {
            Status::error(&e.to_string());
            return exit_code_for(&e);
        }
    };

    if !resolution.build.signing.contains_key(build_type) {
        Status::error(&format!("Unknown build type: {}", build_type));
        return exit_codes::VALIDATION_ERROR;
    }

    for warning in &resolution.warnings {
        Status::warning(&warning.to_string());
    }

    if clean {
        Status::info("Cleaning...");
        if let Err(e) = gradle::clean(&cli.project_dir) {
            Status::error(&format!("Clean failed: {}", e));
            return exit_codes::GRADLE_ERROR;
        }
    }

    let properties = emit::directive_properties(&resolution.build);
    let artifact = if bundle { "bundle" } else { "APK" };
    let pb = progress::spinner(&format!("Building {} {}...", build_type, artifact));
    let start = Instant::now();

    let result = if bundle {
        gradle::bundle(&cli.project_dir, build_type, &properties)
    } else {
        gradle::assemble(&cli.project_dir, build_type, &properties)
    };

    match result {
        Ok(r) if r.success => {
            progress::finish_success(
                &pb,
                &format!("Build succeeded in {}", format_duration(start.elapsed())),
            );
            exit_codes::SUCCESS
        }
        Ok(r) => {
            progress::finish_error(&pb, "Build failed");
            eprintln!("{}", r.stderr);
            exit_codes::GRADLE_ERROR
        }
        Err(e) => {
            progress::finish_error(&pb, "Build failed");
            Status::error(&e.to_string());
            exit_code_for(&e)
        }
    }
}

fn run_doctor(cli: &Cli, json: bool) -> i32 {
    let report = HealthChecker::new()
        .with_android_checks()
        .with_gradle_wrapper(&cli.project_dir)
        .run();

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                Status::error(&format!("Failed to render report: {}", e));
                return exit_codes::FAILURE;
            }
        }
    } else {
        Status::header("Environment Check");
        for check in &report.checks {
            let label = match &check.message {
                Some(message) => format!("{}: {}", check.name, message),
                None => match check.details.get("version") {
                    Some(version) => format!("{}: {}", check.name, version),
                    None => check.name.clone(),
                },
            };
            match check.status {
                HealthStatus::Healthy => Status::success(&label),
                HealthStatus::Degraded => Status::warning(&label),
                _ => Status::error(&label),
            }
        }
    }

    if report.is_healthy() {
        exit_codes::SUCCESS
    } else if report.status == HealthStatus::Degraded {
        exit_codes::SUCCESS
    } else {
        exit_codes::FAILURE
    }
}
