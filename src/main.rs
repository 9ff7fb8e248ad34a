use std::fmt::Display;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use subspace_knn::core::ingestion::Tokenizer;
use subspace_knn::{
    Config, DistanceFunction, DistanceMetric, KdTreeIndex, KnnIndex, KnnPcaPreprocessor, KnnQuery,
    NumberVectorParser, Point, PointId, SubspaceCorrelationDistance,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Exact k-nearest-neighbour queries over a file of number vectors", long_about = None)]
#[command(group(ArgGroup::new("target").required(true).args(["query_id", "query"])))]
struct Cli {
    /// Input file, one vector per line
    #[arg(short, long)]
    input: PathBuf,

    /// Number of neighbours to return
    #[arg(short)]
    k: usize,

    /// Query by the id (0-based line order of accepted records) of an input point
    #[arg(long)]
    query_id: Option<PointId>,

    /// Query by coordinates, e.g. "1.5,-2"
    #[arg(long)]
    query: Option<String>,

    #[arg(long, value_enum, default_value_t = Metric::Euclidean)]
    metric: Metric,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Metric {
    Euclidean,
    Manhattan,
    Chebyshev,
    Correlation,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref())
        .with_context(|| "Failed to load configuration")?;

    let outcome = NumberVectorParser::new()?
        .parse_file(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    if !outcome.rejected.is_empty() {
        eprintln!("{} record(s) rejected", outcome.rejected.len());
    }

    let query_point = cli.query.as_deref().map(parse_query).transpose()?;
    let query = match (&query_point, cli.query_id) {
        (Some(point), _) => KnnQuery::Point(point),
        (None, Some(id)) => KnnQuery::Id(id),
        (None, None) => bail!("either --query-id or --query is required"),
    };

    let scalar = match cli.metric {
        Metric::Euclidean => DistanceMetric::Euclidean,
        Metric::Manhattan => DistanceMetric::Manhattan,
        Metric::Chebyshev => DistanceMetric::Chebyshev,
        Metric::Correlation => {
            let KnnQuery::Id(_) = query else {
                bail!("the correlation metric needs --query-id: coordinates have no local PCA");
            };
            let euclidean =
                KdTreeIndex::build(outcome.points.clone(), DistanceMetric::Euclidean, &config.index)?;
            let descriptors = KnnPcaPreprocessor::from_config(&config.pca)?.run(&euclidean)?;
            let distance = SubspaceCorrelationDistance::from_config(descriptors, &config.correlation)?;
            let index = KdTreeIndex::build(outcome.points, distance, &config.index)?;
            return report(&index, query, cli.k, cli.json);
        }
    };

    let index = KdTreeIndex::build(outcome.points, scalar, &config.index)?;
    report(&index, query, cli.k, cli.json)
}

fn parse_query(text: &str) -> anyhow::Result<Point> {
    let mut tokenizer = Tokenizer::with_defaults()?;
    tokenizer.initialize(text.trim());
    let mut coordinates = Vec::new();
    while tokenizer.valid() {
        coordinates.push(tokenizer.get_f64().with_context(|| format!("Invalid query '{}'", text))?);
        tokenizer.advance();
    }
    Ok(Point::new(PointId::MAX, coordinates))
}

fn report<M>(index: &KdTreeIndex<M>, query: KnnQuery<'_>, k: usize, json: bool) -> anyhow::Result<()>
where
    M: DistanceFunction,
    M::Distance: Display + Serialize,
{
    let results = index
        .k_nearest(query, k)
        .with_context(|| format!("{} query failed", index.metric().name()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            println!("{}\t{}", result.id, result.distance);
        }
    }
    Ok(())
}
