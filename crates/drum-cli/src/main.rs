use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use drum_core::{
    validate_manual_wastage, CalculationMethod, WastageCalculationResult, WastageCalculator,
    WastageError, WastageMethod, WastageRequest,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "drum")]
#[command(about = "Cable drum reconciliation - used, wasted and remaining footage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a drum with its usage records
    Calculate {
        /// Drum file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Use this method instead of the one stored on the drum
        #[arg(short, long, value_enum)]
        method: Option<MethodArg>,

        /// Manual wastage figure in meters
        #[arg(long = "override")]
        manual_override: Option<f64>,

        /// Output file for result (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run smart and legacy methods side by side
    Compare {
        /// Drum file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Check a manual wastage figure against drum capacity
    Validate {
        #[arg(long)]
        wastage: f64,

        #[arg(long)]
        used: f64,

        #[arg(long)]
        capacity: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Smart,
    Legacy,
    Manual,
}

impl From<MethodArg> for CalculationMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Smart => CalculationMethod::SmartSegments,
            MethodArg::Legacy => CalculationMethod::LegacyGaps,
            MethodArg::Manual => CalculationMethod::ManualOverride,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Calculate {
            input,
            method,
            manual_override,
            output,
        } => {
            calculate_command(input, method, manual_override, output)?;
        }
        Commands::Compare { input } => {
            compare_command(input)?;
        }
        Commands::Validate {
            wastage,
            used,
            capacity,
        } => {
            validate_command(wastage, used, capacity)?;
        }
    }

    Ok(())
}

fn load_request(input: &Path) -> Result<WastageRequest> {
    let content = std::fs::read_to_string(input)?;
    let request = match input.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        _ => serde_json::from_str(&content)?,
    };
    Ok(request)
}

fn calculate_command(
    input: PathBuf,
    method: Option<MethodArg>,
    manual_override: Option<f64>,
    output: Option<PathBuf>,
) -> Result<()> {
    println!("{}", "🔍 Loading drum...".bright_blue());

    let mut request = load_request(&input)?;
    if let Some(method) = method {
        request.drum.calculation_method = method.into();
    }
    if manual_override.is_some() {
        request.drum.manual_wastage_override = manual_override;
    }

    println!(
        "  Drum {} ({} m rated)",
        request.drum.id.bright_white().bold(),
        request.drum.initial_quantity
    );
    println!(
        "  {} usage records",
        request.usage_records.len().to_string().bright_white().bold()
    );
    println!();

    let (result, integrity_error) = match request.calculate() {
        Ok(result) => (result, None),
        Err(WastageError::NegativeRemainder {
            method,
            remainder,
            result,
        }) => (*result, Some((method, remainder))),
        Err(err) => return Err(err.into()),
    };

    print_result(&result);

    let json = serde_json::to_string_pretty(&result)?;
    if let Some(output_path) = output {
        std::fs::write(&output_path, json)?;
        println!(
            "💾 Saved result to {}",
            output_path.display().to_string().bright_white()
        );
    } else {
        println!("{}", json);
    }

    if let Some((method, remainder)) = integrity_error {
        bail!(
            "recorded usage exceeds drum capacity under {}: remainder {:.2} m",
            method,
            remainder
        );
    }

    Ok(())
}

fn print_result(result: &WastageCalculationResult) {
    println!(
        "{} {}",
        "📊 Results:".bright_yellow().bold(),
        result.calculation_method.to_string().bright_white()
    );
    println!("  Used:      {:>10.2} m", result.total_used);
    println!("  Wasted:    {:>10.2} m", result.total_wastage);

    let remaining = format!("{:>10.2} m", result.calculated_current_quantity);
    if result.calculated_current_quantity < 0.0 {
        println!("  Remaining: {}", remaining.bright_red().bold());
    } else {
        println!("  Remaining: {}", remaining.bright_green());
    }

    if !result.usage_segments.is_empty() {
        println!("  Used segments:");
        for seg in &result.usage_segments {
            println!("    • {:.2} – {:.2} ({:.2} m)", seg.start, seg.end, seg.length);
        }
    }

    if !result.wasted_segments.is_empty() {
        println!("  Wasted segments:");
        for seg in &result.wasted_segments {
            println!(
                "    • {}",
                format!("{:.2} – {:.2} ({:.2} m)", seg.start, seg.end, seg.length).bright_red()
            );
        }
    }

    if !result.skipped_records.is_empty() {
        println!(
            "  {} {}",
            "Skipped records with unusable marks:".yellow(),
            result.skipped_records.join(", ")
        );
    }

    println!();
}

fn compare_command(input: PathBuf) -> Result<()> {
    let request = load_request(&input)?;
    let calculator = WastageCalculator::new(request.drum.initial_quantity)?;

    println!(
        "{} {}",
        "⚖️  Comparing methods for drum".bright_blue(),
        request.drum.id.bright_white().bold()
    );
    println!();
    println!(
        "  {:<16} {:>12} {:>12} {:>12}",
        "method", "used", "wasted", "remaining"
    );

    let mut wastage = Vec::new();
    for method in [WastageMethod::Smart, WastageMethod::Legacy] {
        let result = match calculator.calculate(&request.usage_records, method) {
            Ok(result) => result,
            Err(WastageError::NegativeRemainder { result, .. }) => *result,
            Err(err) => return Err(err.into()),
        };

        let line = format!(
            "  {:<16} {:>12.2} {:>12.2} {:>12.2}",
            result.calculation_method.to_string(),
            result.total_used,
            result.total_wastage,
            result.calculated_current_quantity
        );
        if result.calculated_current_quantity < 0.0 {
            println!("{}", line.bright_red());
        } else {
            println!("{}", line);
        }
        wastage.push(result.total_wastage);
    }

    println!();
    let divergence = wastage[1] - wastage[0];
    if divergence.abs() < 0.005 {
        println!("{}", "✅ Methods agree on wastage".bright_green());
    } else {
        println!(
            "  Legacy wastage differs from smart by {} m",
            format!("{:+.2}", divergence).bright_yellow().bold()
        );
    }

    Ok(())
}

fn validate_command(wastage: f64, used: f64, capacity: f64) -> Result<()> {
    let outcome = validate_manual_wastage(wastage, used, capacity);

    if outcome.is_valid {
        println!(
            "{} {:.2} m wastage fits ({:.2} m would remain)",
            "✅".bright_green(),
            wastage,
            capacity - used - wastage
        );
        Ok(())
    } else {
        bail!(outcome
            .error
            .unwrap_or_else(|| "invalid wastage".to_string()))
    }
}
