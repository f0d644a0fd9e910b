mod logger;

use anyhow::{Context, Result, bail};
use book_cost::{
    CostBreakdown, CostResult, CurveShape, Markup, PageFormat, PriceRange, PrintJobRequest,
    ProductionPolicy, ProductionProcess, SubstrateSheet,
};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bkt", about = "Book printing cost tools", version)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how many pages of a format fit on the press sheet
    Impose {
        /// Page format, e.g. "A5" or "DIN A4"
        #[arg(short, long)]
        format: String,

        /// Press sheet width in mm
        #[arg(long, default_value = "320")]
        sheet_width: f64,

        /// Press sheet height in mm
        #[arg(long, default_value = "450")]
        sheet_height: f64,

        /// Bleed added to each page dimension in mm
        #[arg(long, default_value = "6")]
        bleed: f64,
    },

    /// Cost a print job
    Quote {
        #[command(flatten)]
        job: JobArgs,

        /// Print every intermediate value
        #[arg(long)]
        breakdown: bool,
    },

    /// Cost a print job at several quantities
    Table {
        #[command(flatten)]
        job: JobArgs,

        /// Quantities to quote
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "1,10,50,100,250,500,1000,3000"
        )]
        quantities: Vec<u32>,
    },
}

#[derive(Args)]
struct JobArgs {
    /// Request JSON file; flags below override its fields
    #[arg(long)]
    request: Option<PathBuf>,

    /// Production process JSON file; flags below override its fields
    #[arg(long)]
    process: Option<PathBuf>,

    /// Page format, e.g. "A5" or "DIN A4"
    #[arg(short, long)]
    format: Option<String>,

    /// Copies ordered
    #[arg(short, long)]
    quantity: Option<u32>,

    /// Pages of a paper class, CLASS=COUNT (repeatable)
    #[arg(long, value_parser = parse_class_pages)]
    pages: Vec<(String, u32)>,

    /// Sheet price of a paper class, CLASS=MIN:MAX or CLASS=PRICE (repeatable)
    #[arg(long, value_parser = parse_class_price)]
    price: Vec<(String, PriceRange)>,

    /// Fixed per-copy price, MIN:MAX or PRICE
    #[arg(long, value_parser = parse_range)]
    fixed: Option<PriceRange>,

    /// Markup percentage, PERCENT or MIN:MAX
    #[arg(long, value_parser = parse_markup)]
    markup: Option<Markup>,

    /// Production policy
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Discount curve shape
    #[arg(long, value_enum)]
    curve: Option<CurveArg>,

    /// Quantity at which the price curve bottoms out
    #[arg(long)]
    saturation: Option<u32>,

    /// Minimum unit price in cents (continuous policy)
    #[arg(long)]
    price_floor: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Batch,
    Continuous,
}

#[derive(Clone, Copy, ValueEnum)]
enum CurveArg {
    Linear,
    Gamma,
}

impl From<PolicyArg> for ProductionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Batch => Self::Batch,
            PolicyArg::Continuous => Self::Continuous,
        }
    }
}

impl From<CurveArg> for CurveShape {
    fn from(arg: CurveArg) -> Self {
        match arg {
            CurveArg::Linear => Self::Linear,
            CurveArg::Gamma => Self::GammaExponential,
        }
    }
}

fn parse_range(s: &str) -> Result<PriceRange, String> {
    let number = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{}': {}", v, e))
    };
    match s.split_once(':') {
        Some((min, max)) => Ok(PriceRange::new(number(min)?, number(max)?)),
        None => Ok(PriceRange::flat(number(s)?)),
    }
}

fn parse_markup(s: &str) -> Result<Markup, String> {
    let range = parse_range(s)?;
    if s.contains(':') {
        Ok(Markup::Range(range))
    } else {
        Ok(Markup::Flat(range.max))
    }
}

fn split_class(s: &str) -> Result<(String, &str), String> {
    let (class, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CLASS=VALUE, got '{}'", s))?;
    let class = class.trim();
    if class.is_empty() {
        return Err(format!("missing paper class in '{}'", s));
    }
    Ok((class.to_string(), value))
}

fn parse_class_pages(s: &str) -> Result<(String, u32), String> {
    let (class, value) = split_class(s)?;
    let pages = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid page count '{}': {}", value, e))?;
    Ok((class, pages))
}

fn parse_class_price(s: &str) -> Result<(String, PriceRange), String> {
    let (class, value) = split_class(s)?;
    Ok((class, parse_range(value)?))
}

impl JobArgs {
    async fn request(&self) -> Result<PrintJobRequest> {
        let mut request = match &self.request {
            Some(path) => PrintJobRequest::load(path)
                .await
                .with_context(|| format!("loading request {}", path.display()))?,
            None => {
                let format = self
                    .format
                    .clone()
                    .context("--format is required without --request")?;
                PrintJobRequest::new(format, 1)
            }
        };

        if let Some(format) = &self.format {
            request.format = format.clone();
        }
        if let Some(quantity) = self.quantity {
            request.quantity = quantity;
        }
        if let Some(fixed) = self.fixed {
            request.fixed_price = Some(fixed);
        }
        if let Some(markup) = self.markup {
            request.markup = Some(markup);
        }

        let prices: BTreeMap<&str, PriceRange> = self
            .price
            .iter()
            .map(|(class, range)| (class.as_str(), *range))
            .collect();

        for (class, pages) in &self.pages {
            let price = match (prices.get(class.as_str()), request.paper.get(class)) {
                (Some(price), _) => *price,
                (None, Some(existing)) => existing.price,
                (None, None) => bail!("no --price given for paper class {}", class),
            };
            request = request.with_paper(class.clone(), *pages, price);
        }
        for (class, price) in &prices {
            if let Some(stock) = request.paper.get_mut(*class) {
                stock.price = *price;
            } else {
                log::warn!("Ignoring price for paper class {} without pages", class);
            }
        }

        Ok(request)
    }

    async fn process(&self) -> Result<ProductionProcess> {
        let mut process = match &self.process {
            Some(path) => ProductionProcess::load(path)
                .await
                .with_context(|| format!("loading process {}", path.display()))?,
            None => match self.policy.map(ProductionPolicy::from) {
                Some(ProductionPolicy::Batch) => ProductionProcess::batch_offset(),
                Some(ProductionPolicy::Continuous) | None => ProductionProcess::digital(),
            },
        };

        if let Some(policy) = self.policy {
            process.policy = policy.into();
        }
        if let Some(curve) = self.curve {
            process.curve = curve.into();
        }
        if let Some(saturation) = self.saturation {
            process.saturation_quantity = saturation;
        }
        if let Some(floor) = self.price_floor {
            process.price_floor = floor;
        }

        process.validate()?;
        Ok(process)
    }
}

fn cents(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let value = value.unsigned_abs();
    format!("{}{}.{:02}", sign, value / 100, value % 100)
}

fn print_breakdown(breakdown: &CostBreakdown) {
    let fit = &breakdown.imposition;
    let demand = &breakdown.demand;

    println!("Imposition:");
    println!(
        "  {} with bleed: {}x{}mm",
        fit.format, fit.width_with_bleed_mm, fit.height_with_bleed_mm
    );
    println!(
        "  Pages per sheet: {} ({:?}; normal {}, rotated {})",
        fit.pages_per_sheet, fit.orientation, fit.normal, fit.rotated
    );

    println!("Sheet demand ({:?}):", demand.policy);
    if demand.policy == ProductionPolicy::Batch {
        println!("  Blocks: {}", demand.blocks);
    }
    println!("  Units produced: {}", demand.units_produced);
    for (class, price) in &breakdown.sheet_prices {
        println!(
            "  {}: {} sheets/run ({} total) at {:.4}",
            class,
            demand.sheets_per_run(class),
            demand.total_sheets(class),
            price
        );
    }

    println!("Pricing:");
    println!("  Curve progress: {:.4}", breakdown.progress);
    if demand.policy == ProductionPolicy::Continuous {
        println!("  Fixed price: {:.4}", breakdown.fixed_price);
        println!("  Markup: {:.4}%", breakdown.markup_percent);
    }
    println!("  Base cost: {:.4}", breakdown.base_cost);
    if breakdown.floor_applied {
        println!("  Price floor applied");
    }
}

fn print_result(result: &CostResult) {
    println!("Per unit: {}", cents(result.per_unit_cost));
    println!("Total: {}", cents(result.total_cost));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::StderrLogger::new(cli.verbose).init()?;

    match cli.command {
        Commands::Impose {
            format,
            sheet_width,
            sheet_height,
            bleed,
        } => {
            let format: PageFormat = format.parse()?;
            let sheet = SubstrateSheet {
                width_mm: sheet_width,
                height_mm: sheet_height,
                bleed_mm: bleed,
            };
            let fit = book_cost::impose_format(format, &sheet)?;

            println!(
                "{} on {}x{}mm (bleed {}mm):",
                format, sheet.width_mm, sheet.height_mm, sheet.bleed_mm
            );
            println!("  Normal: {}", fit.normal);
            println!("  Rotated: {}", fit.rotated);
            println!("  Pages per sheet: {} ({:?})", fit.pages_per_sheet, fit.orientation);
        }

        Commands::Quote { job, breakdown } => {
            let request = job.request().await?;
            let process = job.process().await?;
            log::info!("Quoting {} x{} ({:?})", request.format, request.quantity, process.policy);

            let result = book_cost::compute_breakdown(&request, &process)?;
            if breakdown {
                print_breakdown(&result);
            }
            print_result(&result.result);
        }

        Commands::Table { job, quantities } => {
            let request = job.request().await?;
            let process = job.process().await?;

            let table = book_cost::quote_table(&request, &process, &quantities)?;
            println!("{:>10}  {:>12}  {:>14}", "Quantity", "Per unit", "Total");
            for (quantity, cost) in table {
                println!(
                    "{:>10}  {:>12}  {:>14}",
                    quantity,
                    cents(cost.per_unit_cost),
                    cents(cost.total_cost)
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("2:10").unwrap(), PriceRange::new(2.0, 10.0));
        assert_eq!(parse_range(" 50 ").unwrap(), PriceRange::flat(50.0));
        assert!(parse_range("2:x").is_err());
    }

    #[test]
    fn test_parse_markup() {
        assert_eq!(parse_markup("15").unwrap(), Markup::Flat(15.0));
        assert_eq!(
            parse_markup("10:30").unwrap(),
            Markup::Range(PriceRange::new(10.0, 30.0))
        );
    }

    #[test]
    fn test_parse_class_args() {
        assert_eq!(parse_class_pages("B=32").unwrap(), ("B".to_string(), 32));
        assert!(parse_class_pages("=32").is_err());
        assert!(parse_class_pages("B32").is_err());
        assert_eq!(
            parse_class_price("C=2:10").unwrap(),
            ("C".to_string(), PriceRange::new(2.0, 10.0))
        );
    }

    fn quote_job(args: &[&str]) -> JobArgs {
        let cli = Cli::try_parse_from(["bkt", "quote"].into_iter().chain(args.iter().copied())).unwrap();
        match cli.command {
            Commands::Quote { job, .. } => job,
            _ => panic!("Expected quote command"),
        }
    }

    #[tokio::test]
    async fn test_request_from_flags() {
        let job = quote_job(&[
            "--format", "A5", "--quantity", "20", "--pages", "B=32", "--price", "B=2:10",
        ]);
        let request = job.request().await.unwrap();

        assert_eq!(request.format, "A5");
        assert_eq!(request.quantity, 20);
        assert_eq!(request.paper["B"].pages, 32);
        assert_eq!(request.paper["B"].price, PriceRange::new(2.0, 10.0));
    }

    #[tokio::test]
    async fn test_request_pages_without_price() {
        let job = quote_job(&["--format", "A5", "--pages", "B=32"]);
        let err = job.request().await.unwrap_err();
        assert!(err.to_string().contains("no --price"), "{err}");
    }

    #[tokio::test]
    async fn test_request_ignores_price_without_pages() {
        let job = quote_job(&[
            "--format", "A5", "--pages", "B=32", "--price", "B=2:10", "--price", "C=3:12",
        ]);
        let request = job.request().await.unwrap();

        assert_eq!(request.paper.len(), 1);
        assert!(!request.paper.contains_key("C"));
    }

    #[tokio::test]
    async fn test_request_without_format_or_file() {
        let job = quote_job(&["--quantity", "5"]);
        let err = job.request().await.unwrap_err();
        assert!(err.to_string().contains("--format"), "{err}");
    }

    #[tokio::test]
    async fn test_flags_override_request_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let json = r#"{
            "format": "DIN A5",
            "quantity": 1,
            "paper": {
                "B": { "pages": 32, "price": { "min": 2, "max": 10 } },
                "C": { "pages": 8, "price": { "min": 3, "max": 12 } }
            },
            "fixed_price": { "min": 50, "max": 50 },
            "markup": 0
        }"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();
        let path = temp_file.path().to_str().unwrap();

        let job = quote_job(&[
            "--request", path, "--format", "A4", "--quantity", "250", "--pages", "B=48",
            "--price", "C=4:8", "--markup", "15",
        ]);
        let request = job.request().await.unwrap();

        assert_eq!(request.format, "A4");
        assert_eq!(request.quantity, 250);
        assert_eq!(request.markup, Some(Markup::Flat(15.0)));
        // Untouched fields come from the file
        assert_eq!(request.fixed_price, Some(PriceRange::flat(50.0)));
        // New page count keeps the file's price
        assert_eq!(request.paper["B"].pages, 48);
        assert_eq!(request.paper["B"].price, PriceRange::new(2.0, 10.0));
        // New price keeps the file's page count
        assert_eq!(request.paper["C"].pages, 8);
        assert_eq!(request.paper["C"].price, PriceRange::new(4.0, 8.0));
    }

    #[test]
    fn test_cents() {
        assert_eq!(cents(200), "2.00");
        assert_eq!(cents(123_456), "1234.56");
        assert_eq!(cents(5), "0.05");
        assert_eq!(cents(-250), "-2.50");
    }

    #[test]
    fn test_cli_parses_quote() {
        let cli = Cli::try_parse_from([
            "bkt", "quote", "--format", "DIN A5", "--quantity", "1", "--pages", "B=32",
            "--price", "B=2:10", "--fixed", "50", "--markup", "0", "--policy", "continuous",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Quote { .. }));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
