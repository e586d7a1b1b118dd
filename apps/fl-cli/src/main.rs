//! Command-line front end for driving a flowsheet host session.
//!
//! Runs against the in-memory demo host shipped with `fl-host`, which stands
//! in for a live simulator install. The command surface mirrors what the
//! library exposes: discovery, stream surveys, scalar get/set, composition
//! read/write, and spreadsheet cells.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Parser, Subcommand};
use fl_host::{CellValue, HostInstance, InMemoryHost, MemoryLocator, Property};
use fl_link::{Accessor, AttachMode, LinkError, Session, SessionOptions};
use fl_params::{load_params, ParamsError};
use thiserror::Error;

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Params(#[from] ParamsError),
    #[error(transparent)]
    Host(#[from] fl_host::HostError),
    #[error("{0}")]
    Usage(String),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "fl-cli")]
#[command(about = "Flowsheet host session tool", long_about = None)]
struct Cli {
    /// Case file to open instead of attaching to whatever is active.
    #[arg(long, global = true)]
    case: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List simulator windows visible to the locator
    Discover,
    /// Print a summary of every stream in the active case
    Survey,
    /// Read one property from a stream
    Get {
        /// Stream name
        stream: String,
        /// Property key, e.g. temperature, pressure, molar_flow
        property: String,
        /// Unit label to request from the host (defaults to the usual one)
        #[arg(short, long)]
        unit: Option<String>,
    },
    /// Write one property on a stream
    Set {
        stream: String,
        property: String,
        value: f64,
        #[arg(short, long)]
        unit: Option<String>,
    },
    /// Print the component slate and molar fractions of a stream
    Composition { stream: String },
    /// Write molar fractions from a YAML mapping of component name to value
    SetComposition {
        stream: String,
        /// YAML file, e.g. `{Methane: 0.7, Ethane: 0.3}`
        params: PathBuf,
    },
    /// Read a spreadsheet cell
    Cell {
        /// Spreadsheet operation name
        operation: String,
        /// Cell reference, e.g. A1
        cell: String,
    },
    /// Write a number into a spreadsheet cell
    SetCell {
        operation: String,
        cell: String,
        value: f64,
    },
    /// Install a formula into a spreadsheet cell
    SetFormula {
        operation: String,
        cell: String,
        formula: String,
    },
    /// Save the active case back to its file
    Save,
}

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let locator = demo_locator()?;

    match cli.command {
        Commands::Discover => cmd_discover(&locator),
        Commands::Survey => {
            let session = attached(&locator, cli.case.as_deref())?;
            cmd_survey(&session)
        }
        Commands::Get {
            stream,
            property,
            unit,
        } => {
            let session = attached(&locator, cli.case.as_deref())?;
            cmd_get(&session, &stream, &property, unit.as_deref())
        }
        Commands::Set {
            stream,
            property,
            value,
            unit,
        } => {
            let session = attached(&locator, cli.case.as_deref())?;
            cmd_set(&session, &stream, &property, value, unit.as_deref())
        }
        Commands::Composition { stream } => {
            let session = attached(&locator, cli.case.as_deref())?;
            cmd_composition(&session, &stream)
        }
        Commands::SetComposition { stream, params } => {
            let session = attached(&locator, cli.case.as_deref())?;
            cmd_set_composition(&session, &stream, &params)
        }
        Commands::Cell { operation, cell } => {
            let session = attached(&locator, cli.case.as_deref())?;
            cmd_cell(&session, &operation, &cell)
        }
        Commands::SetCell {
            operation,
            cell,
            value,
        } => {
            let session = attached(&locator, cli.case.as_deref())?;
            cmd_set_cell(&session, &operation, &cell, value)
        }
        Commands::SetFormula {
            operation,
            cell,
            formula,
        } => {
            let session = attached(&locator, cli.case.as_deref())?;
            cmd_set_formula(&session, &operation, &cell, &formula)
        }
        Commands::Save => {
            let session = attached(&locator, cli.case.as_deref())?;
            cmd_save(&session)
        }
    }
}

/// Attach a session, opening `case` if one was given on the command line.
fn attached(locator: &MemoryLocator, case: Option<&Path>) -> CliResult<Session> {
    let mode = match case {
        Some(path) => AttachMode::OpenPath(path.to_path_buf()),
        None => AttachMode::CurrentDocument,
    };
    let mut session = Session::new(SessionOptions::default());
    session.attach(locator, mode)?;
    Ok(session)
}

fn cmd_discover(locator: &MemoryLocator) -> CliResult<()> {
    let discovery = Session::discover(locator);
    if discovery.windows.is_empty() {
        println!("No simulator windows found");
    } else {
        println!("Simulator windows:");
        for window in &discovery.windows {
            println!("  {}", window.title);
        }
    }
    if discovery.instances.is_empty() {
        println!("No attachable instances found");
    } else {
        println!("Attachable instances:");
        for label in &discovery.instances {
            println!("  {label}");
        }
    }
    Ok(())
}

fn cmd_survey(session: &Session) -> CliResult<()> {
    let info = session.case_info()?;
    println!("Case: {}", info.title);
    if let Some(path) = info.path {
        println!("File: {}", path.display());
    }

    println!("\nMaterial streams:");
    for name in session.material_stream_names()? {
        let stream = session.material_stream(&name)?;
        println!(
            "  {name}: T={:.2} K  P={:.3} bar  F={:.2} gmole/s",
            stream.temperature()?,
            stream.pressure()?,
            stream.molar_flow()?,
        );
        let fractions = stream.component_molar_fractions()?;
        let slate = stream
            .component_names()?
            .iter()
            .filter_map(|component| {
                fractions
                    .get(component)
                    .map(|x| format!("{component}={x:.4}"))
            })
            .collect::<Vec<_>>()
            .join("  ");
        println!("    {slate}");
    }

    println!("\nEnergy streams:");
    for name in session.energy_stream_names()? {
        let stream = session.energy_stream(&name)?;
        println!("  {name}: Q={:.4e} kJ/h", stream.heat_flow()?);
    }

    println!("\nOperations:");
    for name in session.operation_names()? {
        println!("  {name}");
    }
    Ok(())
}

fn cmd_get(session: &Session, stream: &str, property: &str, unit: Option<&str>) -> CliResult<()> {
    // Material streams are searched first, then energy streams.
    let accessor = session.stream(stream)?;
    print_value(&accessor, property, unit)
}

fn print_value(accessor: &Accessor<'_>, property: &str, unit: Option<&str>) -> CliResult<()> {
    match Property::from_str(property) {
        Ok(prop) => {
            let value = match unit {
                Some(unit) => accessor.get_in(prop, unit)?,
                None => accessor.get(prop)?,
            };
            let label = unit.or(prop.canonical_unit()).unwrap_or("-");
            println!("{} = {value} [{label}]", prop.display_name());
        }
        // Not one of the well-known keys: ask the host for it verbatim.
        Err(_) => {
            let value = accessor.get_raw(property, unit)?;
            let label = unit.unwrap_or("native");
            println!("{property} = {value} [{label}]");
        }
    }
    Ok(())
}

fn cmd_set(
    session: &Session,
    stream: &str,
    property: &str,
    value: f64,
    unit: Option<&str>,
) -> CliResult<()> {
    let accessor = session.stream(stream)?;
    match Property::from_str(property) {
        Ok(prop) => match unit {
            Some(unit) => accessor.set_in(prop, unit, value)?,
            None => accessor.set(prop, value)?,
        },
        Err(_) => accessor.set_raw(property, unit, value)?,
    }
    println!("✓ {stream}.{property} = {value}");
    Ok(())
}

fn cmd_composition(session: &Session, stream: &str) -> CliResult<()> {
    let material = session.material_stream(stream)?;
    let fractions = material.component_molar_fractions()?;
    println!("Composition of {stream}:");
    for component in material.component_names()? {
        if let Some(x) = fractions.get(&component) {
            println!("  {component:<16} {x:.6}");
        }
    }
    Ok(())
}

fn cmd_set_composition(session: &Session, stream: &str, params_path: &Path) -> CliResult<()> {
    let params = load_params(params_path)?;
    let mut fractions = BTreeMap::new();
    for key in params.keys() {
        fractions.insert(key.to_owned(), params.float(key)?);
    }
    if fractions.is_empty() {
        return Err(CliError::Usage(format!(
            "{} holds no component entries",
            params_path.display()
        )));
    }

    let material = session.material_stream(stream)?;
    material.set_component_molar_fractions(&fractions)?;
    println!("✓ wrote {} fractions to {stream}", fractions.len());
    Ok(())
}

fn cmd_cell(session: &Session, operation: &str, cell: &str) -> CliResult<()> {
    let sheet = session.spreadsheet(operation)?;
    match sheet.cell(cell)? {
        CellValue::Number(value) => println!("{operation}!{cell} = {value}"),
        CellValue::Text(text) => println!("{operation}!{cell} = \"{text}\""),
        CellValue::Empty => println!("{operation}!{cell} is empty"),
    }
    if let Some(formula) = sheet.formula(cell)? {
        println!("  formula: {formula}");
    }
    Ok(())
}

fn cmd_set_cell(session: &Session, operation: &str, cell: &str, value: f64) -> CliResult<()> {
    let sheet = session.spreadsheet(operation)?;
    sheet.set_number(cell, value)?;
    println!("✓ {operation}!{cell} = {value}");
    Ok(())
}

fn cmd_set_formula(session: &Session, operation: &str, cell: &str, formula: &str) -> CliResult<()> {
    let sheet = session.spreadsheet(operation)?;
    sheet.set_formula(cell, formula)?;
    println!("✓ {operation}!{cell} formula = {formula}");
    Ok(())
}

fn cmd_save(session: &Session) -> CliResult<()> {
    session.save()?;
    let info = session.case_info()?;
    match info.path {
        Some(path) => println!("✓ saved {}", path.display()),
        None => println!("✓ saved"),
    }
    Ok(())
}

/// Build the demo locator: one host, one case, a small separator flowsheet.
fn demo_locator() -> CliResult<MemoryLocator> {
    let host = InMemoryHost::new("Demo");
    let case = host.add_case("Separator demo", Some(Path::new("demo.fls")));
    host.set_component_groups(case, &[&["Methane", "Ethane", "Propane", ""], &["CO2"]])?;

    let feed = host.add_material_stream(case, "Feed")?;
    host.seed_scalar(feed, "Temperature", 310.0)?;
    host.seed_scalar(feed, "Pressure", 5.0)?;
    host.seed_scalar(feed, "MolarFlow", 120.0)?;
    host.seed_scalar(feed, "MassFlow", 9244.8)?;
    host.seed_scalar(feed, "HeatFlow", -1.2e6)?;
    host.seed_scalar(feed, "VapourFraction", 0.85)?;
    host.seed_scalar(feed, "MolecularWeight", 21.4)?;
    host.seed_scalar(feed, "ZFactor", 0.93)?;
    host.seed_vector(feed, "ComponentMolarFraction", &[0.60, 0.25, 0.05, 0.10])?;
    host.seed_vector(feed, "ComponentMolarFlow", &[72.0, 30.0, 6.0, 12.0])?;

    let overhead = host.add_material_stream(case, "Overhead")?;
    host.seed_scalar(overhead, "Temperature", 285.5)?;
    host.seed_scalar(overhead, "Pressure", 4.8)?;
    host.seed_scalar(overhead, "MolarFlow", 85.0)?;
    host.seed_scalar(overhead, "MassFlow", 5477.4)?;
    host.seed_scalar(overhead, "HeatFlow", -6.5e5)?;
    host.seed_scalar(overhead, "VapourFraction", 1.0)?;
    host.seed_scalar(overhead, "MolecularWeight", 17.9)?;
    host.seed_scalar(overhead, "ZFactor", 0.96)?;
    host.seed_vector(overhead, "ComponentMolarFraction", &[0.82, 0.15, 0.02, 0.01])?;
    host.seed_vector(overhead, "ComponentMolarFlow", &[69.7, 12.75, 1.7, 0.85])?;

    let bottoms = host.add_material_stream(case, "Bottoms")?;
    host.seed_scalar(bottoms, "Temperature", 322.0)?;
    host.seed_scalar(bottoms, "Pressure", 5.1)?;
    host.seed_scalar(bottoms, "MolarFlow", 35.0)?;
    host.seed_scalar(bottoms, "MassFlow", 3767.4)?;
    host.seed_scalar(bottoms, "HeatFlow", -4.1e5)?;
    host.seed_scalar(bottoms, "VapourFraction", 0.0)?;
    host.seed_scalar(bottoms, "MolecularWeight", 29.9)?;
    host.seed_scalar(bottoms, "ZFactor", 0.012)?;
    host.seed_vector(bottoms, "ComponentMolarFraction", &[0.07, 0.49, 0.12, 0.32])?;
    host.seed_vector(bottoms, "ComponentMolarFlow", &[2.45, 17.15, 4.2, 11.2])?;

    let duty = host.add_energy_stream(case, "Q-100")?;
    host.seed_scalar(duty, "HeatFlow", -3.6e5)?;
    let condenser = host.add_energy_stream(case, "Q-COND")?;
    host.seed_scalar(condenser, "HeatFlow", -2.2e5)?;

    let sheet = host.add_spreadsheet(case, "SHEET-1")?;
    host.set_cell_value(sheet, "A1", &CellValue::Number(42.0))?;
    host.set_cell_formula(sheet, "B1", "=A1*2")?;

    Ok(MemoryLocator::new(host))
}
