//! CLI entry point for the byo 68000 runner.

mod logger;

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use byo_core::{new_cpu, Bus, Cpu, CpuConfig, CpuModel, Ram, Rom, UnknownCpuModel};

const USAGE_TEXT: &str = "\
Usage: byo [options]

Options:
  --cpu <type>                    CPU type (default: 68000)
  --ram <size@address>[,...]      Attach RAM regions (default: 0x8000@0x0000)
  --rom <path@address>            Attach a ROM region holding the file's bytes
  --load <path@address>           Copy a file onto the bus after power-on reset
  --steps <n>                     Instructions to execute (default: 1)
  -v, --verbose                   Raise log verbosity (repeatable)
  -h, --help                      Show this help message

Numbers accept decimal or 0x-prefixed hexadecimal.

Examples:
  byo --rom boot.bin@0x0000 --ram 0x8000@0x8000 --steps 10
  byo --ram 0x10000@0 --load program.bin@0 -vvv
";

const DEFAULT_RAM: RegionSpec = RegionSpec::Ram {
    size: 0x8000,
    address: 0,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum RegionSpec {
    Ram { size: usize, address: u64 },
    Rom { path: PathBuf, address: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RunArgs {
    model: CpuModel,
    regions: Vec<RegionSpec>,
    loads: Vec<(PathBuf, u64)>,
    steps: u64,
    verbosity: u8,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            model: CpuModel::default(),
            regions: Vec::new(),
            loads: Vec::new(),
            steps: 1,
            verbosity: 0,
        }
    }
}

#[derive(Debug)]
enum ParseResult {
    Run(RunArgs),
    Help,
}

fn parse_number(text: &str) -> Result<u64, String> {
    let parsed = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .map_or_else(|| text.parse::<u64>(), |hex| u64::from_str_radix(hex, 16));
    parsed.map_err(|_| format!("invalid number: {text}"))
}

fn split_at_sign(text: &str) -> Result<(&str, u64), String> {
    let (left, address) = text
        .rsplit_once('@')
        .ok_or_else(|| format!("expected <value>@<address>, got: {text}"))?;
    Ok((left, parse_number(address)?))
}

fn parse_ram(text: &str) -> Result<Vec<RegionSpec>, String> {
    text.split(',')
        .map(|item| {
            let (size, address) = split_at_sign(item)?;
            let size = usize::try_from(parse_number(size)?)
                .map_err(|_| format!("RAM size too large: {size}"))?;
            Ok(RegionSpec::Ram { size, address })
        })
        .collect()
}

fn parse_path_at(text: &str) -> Result<(PathBuf, u64), String> {
    let (path, address) = split_at_sign(text)?;
    if path.is_empty() {
        return Err(format!("missing path in: {text}"));
    }
    Ok((PathBuf::from(path), address))
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut run = RunArgs::default();

    while let Some(arg) = args.next() {
        let arg = arg.to_string_lossy().to_string();
        match arg.as_str() {
            "-h" | "--help" => return Ok(ParseResult::Help),
            "-v" | "--verbose" => {
                run.verbosity = run.verbosity.saturating_add(1);
                continue;
            }
            _ => {}
        }

        if let Some(count) = arg.strip_prefix('-').filter(|rest| {
            !rest.is_empty() && rest.chars().all(|c| c == 'v')
        }) {
            let count = u8::try_from(count.len()).unwrap_or(u8::MAX);
            run.verbosity = run.verbosity.saturating_add(count);
            continue;
        }

        let mut value = || {
            args.next()
                .map(|v| v.to_string_lossy().to_string())
                .ok_or_else(|| format!("missing value for {arg}"))
        };

        match arg.as_str() {
            "--cpu" => {
                run.model = value()?
                    .parse()
                    .map_err(|e: UnknownCpuModel| e.to_string())?;
            }
            "--ram" => run.regions.extend(parse_ram(&value()?)?),
            "--rom" => {
                let (path, address) = parse_path_at(&value()?)?;
                run.regions.push(RegionSpec::Rom { path, address });
            }
            "--load" => run.loads.push(parse_path_at(&value()?)?),
            "--steps" => run.steps = parse_number(&value()?)?,
            other => return Err(format!("unknown option: {other}")),
        }
    }

    if !run
        .regions
        .iter()
        .any(|region| matches!(region, RegionSpec::Ram { .. }))
    {
        run.regions.push(DEFAULT_RAM);
    }

    Ok(ParseResult::Run(run))
}

fn build_bus(regions: &[RegionSpec]) -> Result<Bus, String> {
    let mut bus = Bus::new();
    for region in regions {
        match region {
            RegionSpec::Ram { size, address } => {
                bus.attach(*address, Ram::new(*size));
            }
            RegionSpec::Rom { path, address } => {
                let rom = Rom::from_file_exact(path)
                    .map_err(|e| format!("{}: {e}", path.display()))?;
                bus.attach(*address, rom);
            }
        }
    }
    Ok(bus)
}

fn load_images(bus: &mut Bus, loads: &[(PathBuf, u64)]) -> Result<(), String> {
    for (path, address) in loads {
        let image =
            fs::read(path).map_err(|e| format!("cannot read image {}: {e}", path.display()))?;
        bus.write(*address, &image).map_err(|e| e.to_string())?;
        log::info!(
            "loaded {} ({} bytes) at {address:#010x}",
            path.display(),
            image.len()
        );
    }
    Ok(())
}

fn run(args: &RunArgs) -> Result<(), i32> {
    logger::init(logger::level_for(args.verbosity));

    let mut bus = match build_bus(&args.regions) {
        Ok(bus) => bus,
        Err(error) => {
            eprintln!("error: {error}");
            return Err(1);
        }
    };

    bus.reset(true);
    if let Err(error) = load_images(&mut bus, &args.loads) {
        eprintln!("error: {error}");
        return Err(1);
    }

    let config = CpuConfig {
        model: args.model,
        trace_instructions: args.verbosity >= 3,
    };
    let mut cpu = new_cpu(&config);
    if let Err(fault) = cpu.reset(&bus) {
        eprintln!("error: reset failed: {fault}");
        return Err(1);
    }

    let outcome = execute(cpu.as_mut(), &mut bus, args.steps);
    println!("{}", cpu.registers());
    outcome
}

fn execute(cpu: &mut dyn Cpu, bus: &mut Bus, steps: u64) -> Result<(), i32> {
    for _ in 0..steps {
        let pc = cpu.registers().pc();
        match cpu.disassemble(bus, pc) {
            Ok((text, _)) => println!("{pc:08x}  {text}"),
            Err(fault) => {
                eprintln!("error: {fault}");
                return Err(1);
            }
        }
        if let Err(fault) = cpu.step(bus) {
            eprintln!("error: {fault}");
            return Err(1);
        }
    }
    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => match run(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}
