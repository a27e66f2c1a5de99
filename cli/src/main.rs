//! readaloud CLI - PDF to narrated audio

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use readaloud::{
    suggested_filename, DocumentText, EdgeTtsCommand, Error, Gender, LanguageResolution,
    LinguaDetector, Locale, LopdfSource, NarrateOptions, Narrator, OcrService, PageSelection,
    PdftoppmRasterizer, ReadingOrder, SpeechRate, TextExtractor, VoiceProfile,
};
use readaloud::ocr::TesseractLoader;

#[derive(Parser)]
#[command(name = "readaloud")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Turn PDF documents into narrated MP3 audio", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output MP3 file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    pipeline: PipelineArgs,

    #[command(flatten)]
    voice: VoiceArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Narrate a PDF into an MP3 file
    Speak {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to <FILE stem>.mp3)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,

        #[command(flatten)]
        voice: VoiceArgs,
    },

    /// Print reading-order text
    Text {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output per-page JSON instead of plain text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Detect the document language and the voice that would be used
    Detect {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        #[command(flatten)]
        voice: VoiceArgs,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// List available voices
    Voices,

    /// Show version information
    Version,
}

/// Extraction settings shared by every document command.
#[derive(Args, Clone)]
struct PipelineArgs {
    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Column reading order
    #[arg(long, value_enum, default_value = "rtl")]
    layout: LayoutMode,

    /// Pages with fewer characters than this are sent to OCR
    #[arg(long, default_value_t = readaloud::options::DEFAULT_OCR_THRESHOLD)]
    ocr_threshold: usize,

    /// Disable the OCR fallback
    #[arg(long)]
    no_ocr: bool,

    /// Process pages one at a time
    #[arg(long)]
    sequential: bool,

    /// tesseract executable
    #[arg(long, env = "READALOUD_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// pdftoppm executable
    #[arg(long, env = "READALOUD_PDFTOPPM", default_value = "pdftoppm")]
    pdftoppm: PathBuf,
}

/// Voice settings.
#[derive(Args, Clone)]
struct VoiceArgs {
    /// Voice gender
    #[arg(long, value_enum, default_value = "female")]
    gender: GenderArg,

    /// Speaking rate as a signed percentage (e.g. +10%, -20%)
    #[arg(long, default_value = "+0%", allow_hyphen_values = true)]
    rate: String,

    /// Force a locale (he or en) instead of detecting it
    #[arg(long)]
    locale: Option<String>,

    /// Locale used when the detected language is not supported
    #[arg(long, default_value = "en")]
    default_locale: String,

    /// edge-tts executable
    #[arg(long, env = "READALOUD_EDGE_TTS", default_value = "edge-tts")]
    edge_tts: PathBuf,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LayoutMode {
    /// Two columns, right column first
    Rtl,
    /// Two columns, left column first
    Ltr,
    /// Single column
    Single,
}

impl From<LayoutMode> for ReadingOrder {
    fn from(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Rtl => ReadingOrder::RightToLeft,
            LayoutMode::Ltr => ReadingOrder::LeftToRight,
            LayoutMode::Single => ReadingOrder::SingleColumn,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum GenderArg {
    /// Female voice
    Female,
    /// Male voice
    Male,
}

impl From<GenderArg> for Gender {
    fn from(gender: GenderArg) -> Self {
        match gender {
            GenderArg::Female => Gender::Female,
            GenderArg::Male => Gender::Male,
        }
    }
}

/// ISO 639 code recorded when the detector could not decide.
const UNDETERMINED: &str = "und";

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Speak {
            input,
            output,
            pipeline,
            voice,
        }) => cmd_speak(&input, output.as_deref(), &pipeline, &voice),
        Some(Commands::Text {
            input,
            output,
            json,
            pipeline,
        }) => cmd_text(&input, output.as_deref(), json, &pipeline),
        Some(Commands::Detect {
            input,
            pipeline,
            voice,
        }) => cmd_detect(&input, &pipeline, &voice),
        Some(Commands::Info { input, pipeline }) => cmd_info(&input, &pipeline),
        Some(Commands::Voices) => {
            cmd_voices();
            Ok(())
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: speak if input is provided
            if let Some(input) = cli.input {
                cmd_speak(&input, cli.output.as_deref(), &cli.pipeline, &cli.voice)
            } else {
                println!("{}", "Usage: readaloud <FILE> [OUTPUT]".yellow());
                println!("       readaloud --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_options(pipeline: &PipelineArgs, voice: Option<&VoiceArgs>) -> CliResult<NarrateOptions> {
    let pages = match &pipeline.pages {
        Some(p) => PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?,
        None => PageSelection::All,
    };

    let mut options = NarrateOptions::new()
        .with_pages(pages)
        .with_reading_order(pipeline.layout.into())
        .with_ocr_threshold(pipeline.ocr_threshold)
        .with_parallel(!pipeline.sequential);

    if let Some(voice) = voice {
        options = options
            .with_gender(voice.gender.into())
            .with_rate(SpeechRate::parse(&voice.rate)?)
            .with_default_locale(voice.default_locale.parse::<Locale>()?);
        if let Some(locale) = &voice.locale {
            options = options.with_locale(locale.parse::<Locale>()?);
        }
    }
    Ok(options)
}

fn open_source(input: &Path, pipeline: &PipelineArgs) -> CliResult<LopdfSource> {
    let source = LopdfSource::open(input)?;
    Ok(source.with_rasterizer(Arc::new(PdftoppmRasterizer::new(&pipeline.pdftoppm))))
}

fn build_ocr(pipeline: &PipelineArgs) -> Option<Arc<OcrService>> {
    if pipeline.no_ocr {
        return None;
    }
    let loader = TesseractLoader::new(&pipeline.tesseract);
    Some(Arc::new(OcrService::with_all_locales(Arc::new(loader))))
}

fn build_narrator(pipeline: &PipelineArgs, options: NarrateOptions, edge_tts: &Path) -> Narrator {
    let narrator = Narrator::new(
        Arc::new(LinguaDetector::new()),
        Arc::new(EdgeTtsCommand::new(edge_tts)),
    )
    .with_options(options);

    match build_ocr(pipeline) {
        Some(ocr) => narrator.with_ocr(ocr),
        None => narrator,
    }
}

fn extract_text(source: &LopdfSource, pipeline: &PipelineArgs) -> CliResult<DocumentText> {
    let options = build_options(pipeline, None)?;
    let extractor = TextExtractor::from_options(&options).with_ocr(build_ocr(pipeline));
    Ok(extractor.extract(source)?)
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

/// Detect the language, falling back to the default locale when the
/// detector cannot decide.
fn resolve_or_default(narrator: &Narrator, document: &DocumentText) -> CliResult<LanguageResolution> {
    match narrator.resolve_language(document) {
        Ok(resolution) => Ok(resolution),
        Err(e) if e.is_recoverable() => {
            let locale = narrator.options().default_locale;
            log::warn!("{}; using {}", e, locale.name());
            Ok(LanguageResolution {
                detected_code: UNDETERMINED.to_string(),
                locale,
                fallback: true,
            })
        }
        Err(e) => Err(e.into()),
    }
}

fn extract_document(narrator: &Narrator, source: &LopdfSource) -> CliResult<DocumentText> {
    let document = narrator.extract(source)?;
    if document.is_empty() {
        return Err(Error::ExtractionEmpty.into());
    }
    Ok(document)
}

fn cmd_speak(
    input: &Path,
    output: Option<&Path>,
    pipeline: &PipelineArgs,
    voice: &VoiceArgs,
) -> CliResult {
    let options = build_options(pipeline, Some(voice))?;
    let source = open_source(input, pipeline)?;
    let narrator = build_narrator(pipeline, options, &voice.edge_tts);

    let pb = spinner("Extracting text...");
    let document = extract_document(&narrator, &source);
    let document = match document {
        Ok(document) => document,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Detecting language...");
    let resolution = resolve_or_default(&narrator, &document)?;

    pb.set_message("Synthesizing speech...");
    let rt = tokio::runtime::Runtime::new()?;
    let audio = rt.block_on(narrator.synthesize(document.as_str(), resolution.locale));
    let audio = match audio {
        Ok(audio) => audio,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };

    let output = output.map(Path::to_path_buf).unwrap_or_else(|| {
        let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned());
        PathBuf::from(suggested_filename(stem.as_deref()))
    });
    fs::write(&output, audio.as_bytes())?;
    pb.finish_with_message("Done!");

    let stats = document.stats();
    let voice_profile = VoiceProfile::new(resolution.locale, voice.gender.into());
    println!();
    println!("{}: {}", "Language".bold(), describe(&resolution));
    println!("{}: {}", "Voice".bold(), voice_profile);
    println!(
        "{}: {} ({} digital, {} OCR, {} empty)",
        "Pages".bold(),
        stats.page_count,
        stats.digital_pages,
        stats.ocr_pages,
        stats.empty_pages
    );
    println!("{} {} ({} bytes)", "Saved to".green(), output.display(), audio.len());

    Ok(())
}

fn cmd_text(input: &Path, output: Option<&Path>, json: bool, pipeline: &PipelineArgs) -> CliResult {
    let source = open_source(input, pipeline)?;
    let document = extract_text(&source, pipeline)?;

    let text = if json {
        serde_json::to_string_pretty(&document)?
    } else {
        document.text
    };

    if let Some(path) = output {
        fs::write(path, &text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }

    Ok(())
}

fn cmd_detect(input: &Path, pipeline: &PipelineArgs, voice: &VoiceArgs) -> CliResult {
    let options = build_options(pipeline, Some(voice))?;
    let source = open_source(input, pipeline)?;
    let narrator = build_narrator(pipeline, options, &voice.edge_tts);

    let document = extract_document(&narrator, &source)?;
    let resolution = narrator.resolve_language(&document)?;
    let voice_profile = VoiceProfile::new(resolution.locale, voice.gender.into());

    println!("{}: {}", "Language".bold(), describe(&resolution));
    println!("{}: {}", "Voice".bold(), voice_profile);
    Ok(())
}

fn cmd_info(input: &Path, pipeline: &PipelineArgs) -> CliResult {
    let data = fs::read(input)?;
    let header = readaloud::sniff_pdf(&data)?;
    let source = LopdfSource::from_bytes(data)?
        .with_rasterizer(Arc::new(PdftoppmRasterizer::new(&pipeline.pdftoppm)));
    let document = extract_text(&source, pipeline)?;
    let stats = document.stats();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), header);
    println!("{}: {}", "Pages".bold(), readaloud::DocumentSource::page_count(&source));

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Digital pages".bold(), stats.digital_pages);
    println!("{}: {}", "OCR pages".bold(), stats.ocr_pages);
    println!("{}: {}", "Empty pages".bold(), stats.empty_pages);
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);

    Ok(())
}

fn cmd_voices() {
    println!("{}", "Available Voices".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for voice in VoiceProfile::all() {
        println!(
            "  {:<8} {:<7} {}",
            voice.locale.name(),
            voice.gender.to_string(),
            voice.voice_id().green()
        );
    }
}

fn cmd_version() {
    println!("{} {}", "readaloud".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF to narrated audio tool");
    println!();
    println!("License: MIT");
}

fn describe(resolution: &LanguageResolution) -> String {
    if resolution.detected_code == UNDETERMINED {
        format!("{} (detection failed)", resolution.locale.name())
    } else if resolution.fallback {
        format!(
            "{} (detected {}, not supported)",
            resolution.locale.name(),
            resolution.detected_code
        )
    } else {
        format!("{} ({})", resolution.locale.name(), resolution.detected_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolution(code: &str, locale: Locale, fallback: bool) -> LanguageResolution {
        LanguageResolution {
            detected_code: code.to_string(),
            locale,
            fallback,
        }
    }

    #[test]
    fn test_describe_detected_language() {
        let text = describe(&resolution("he", Locale::Hebrew, false));
        assert_eq!(text, format!("{} (he)", Locale::Hebrew.name()));
    }

    #[test]
    fn test_describe_unsupported_language() {
        let text = describe(&resolution("fr", Locale::English, true));
        assert!(text.contains("detected fr, not supported"));
    }

    #[test]
    fn test_describe_failed_detection() {
        let text = describe(&resolution(UNDETERMINED, Locale::English, true));
        assert!(text.contains("detection failed"));
        assert!(!text.contains("not supported"));
    }
}
