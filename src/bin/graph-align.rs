use std::io::{self, BufWriter, Write};
use std::time::Instant;
use std::{env, process};

use graph_aligner::{formats, utils};
use graph_aligner::{Graph, GraphAlignmentEngine, ScalarAligner, ScoringParams};

use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    // Load the graph.
    if config.progress {
        eprintln!("Loading graph {}", config.graph_file);
    }
    let graph = Graph::load_gfa(&config.graph_file)?;
    if config.progress {
        eprintln!(
            "The graph contains {} nodes, {} edges, and {} bp",
            graph.node_count(), graph.edge_count(), graph.sequence_len()
        );
    }
    let engine = GraphAlignmentEngine::new(&graph, config.scoring, ScalarAligner::new())?;

    // Load the reads.
    if config.progress {
        let size = utils::file_size(&config.reads_file).unwrap_or(String::from("unknown size"));
        eprintln!("Loading reads from {} ({})", config.reads_file, size);
    }
    let mut reader = utils::open_file(&config.reads_file)?;
    let reads = formats::read_sequences(&mut reader)?;
    if config.progress {
        let total: usize = reads.iter().map(|read| read.sequence.len()).sum();
        eprintln!("Loaded {} reads with {} bp", reads.len(), total);
    }

    // Align the reads.
    let align_start = Instant::now();
    let mut output = BufWriter::new(io::stdout().lock());
    if !config.json {
        formats::write_gaf_file_header(&mut output).map_err(|x| x.to_string())?;
    }
    let mut stats = Statistics::default();
    for read in reads.iter() {
        let alignment = engine.align_named(&read.name, &read.sequence)?;
        stats.add(&alignment);
        if config.json {
            writeln!(output, "{}", alignment.to_json()).map_err(|x| x.to_string())?;
        } else {
            let mut line = alignment.to_gaf_line(&graph)?;
            line.push(b'\n');
            output.write_all(&line).map_err(|x| x.to_string())?;
        }
    }
    output.flush().map_err(|x| x.to_string())?;

    // Statistics.
    if config.progress {
        let seconds = Instant::now().duration_since(align_start).as_secs_f64();
        stats.report(seconds);
    }

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    if config.progress {
        eprintln!("Used {:.3} seconds", seconds);
    }

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub graph_file: String,
    pub reads_file: String,
    pub scoring: ScoringParams,
    pub json: bool,
    pub progress: bool,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] graph.gfa[.gz] reads.fa[.gz] > output.gaf", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("m", "match", &format!("score for a match (default: {})", ScoringParams::DEFAULT_MATCH), "INT");
        opts.optopt("x", "mismatch", &format!("penalty for a mismatch (default: {})", ScoringParams::DEFAULT_MISMATCH), "INT");
        opts.optopt("o", "gap-open", &format!("penalty for opening a gap (default: {})", ScoringParams::DEFAULT_GAP_OPEN), "INT");
        opts.optopt("e", "gap-extension", &format!("penalty for extending a gap (default: {})", ScoringParams::DEFAULT_GAP_EXTENSION), "INT");
        opts.optflag("j", "json", "write JSON lines instead of GAF");
        opts.optflag("p", "progress", "print progress information to stderr");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }

        let match_score = Self::parse_score(&matches, "match", ScoringParams::DEFAULT_MATCH);
        let mismatch = Self::parse_score(&matches, "mismatch", ScoringParams::DEFAULT_MISMATCH);
        let gap_open = Self::parse_score(&matches, "gap-open", ScoringParams::DEFAULT_GAP_OPEN);
        let gap_extension = Self::parse_score(&matches, "gap-extension", ScoringParams::DEFAULT_GAP_EXTENSION);
        let scoring = match ScoringParams::new(match_score, mismatch, gap_open, gap_extension) {
            Ok(scoring) => scoring,
            Err(message) => {
                eprintln!("{}", message);
                process::exit(1);
            }
        };

        if matches.free.len() != 2 {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        }
        let graph_file = matches.free[0].clone();
        let reads_file = matches.free[1].clone();

        Config {
            graph_file,
            reads_file,
            scoring,
            json: matches.opt_present("j"),
            progress: matches.opt_present("p"),
        }
    }

    fn parse_score(matches: &getopts::Matches, option: &str, default: i32) -> i32 {
        match matches.opt_str(option) {
            Some(s) => match s.parse::<i32>() {
                Ok(value) => value,
                Err(f) => {
                    eprintln!("--{}: {}", option, f);
                    process::exit(1);
                }
            },
            None => default,
        }
    }
}

//-----------------------------------------------------------------------------

#[derive(Default)]
struct Statistics {
    reads: usize,
    bases: usize,
    score: isize,
    matches: usize,
    edits: usize,
}

impl Statistics {
    fn add(&mut self, alignment: &graph_aligner::Alignment) {
        self.reads += 1;
        self.bases += alignment.sequence.len();
        self.score += alignment.score;
        let (matches, mismatches, insertions, deletions) = alignment.edit_counts();
        self.matches += matches;
        self.edits += mismatches + insertions + deletions;
    }

    fn report(&self, seconds: f64) {
        eprintln!("Aligned {} reads with {} bp in {:.3} seconds", self.reads, self.bases, seconds);
        if self.reads > 0 {
            let mean = self.score as f64 / self.reads as f64;
            eprintln!("Mean score {:.2}; {} matching bases and {} edited bases", mean, self.matches, self.edits);
        }
    }
}

//-----------------------------------------------------------------------------
