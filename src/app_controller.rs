use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use crate::app_config::Config;
use crate::docx::DocxPackage;
use crate::file_utils::FileManager;
use crate::pipeline::{TranslationJob, TranslationPipeline};
use crate::providers::Provider;

/// Main application controller for document translation
pub struct Controller {
    config: Config,
    provider_override: Option<Arc<dyn Provider>>,
}

impl Controller {
    /// Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            provider_override: None,
        })
    }

    /// Create a controller with an explicit provider (tests and embedders)
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Result<Self> {
        Ok(Self {
            config,
            provider_override: Some(provider),
        })
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.source_language.is_empty() && !self.config.target_language.is_empty()
    }

    /// Translate a single document into the output directory
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_dir: PathBuf,
        force_overwrite: bool,
    ) -> Result<()> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(input_file, output_dir, &multi_progress, force_overwrite)
            .await
    }

    /// Translate every document found under a directory
    pub async fn run_folder(
        &self,
        input_dir: PathBuf,
        output_dir: PathBuf,
        force_overwrite: bool,
    ) -> Result<()> {
        let documents: Vec<PathBuf> = FileManager::find_docx_files(&input_dir)?
            .into_iter()
            .filter(|path| !FileManager::is_translation_output(path, &self.config.target_language))
            .collect();

        if documents.is_empty() {
            warn!("No documents found under {:?}", input_dir);
            return Ok(());
        }
        info!("Found {} documents to translate", documents.len());

        let multi_progress = MultiProgress::new();
        let folder_bar = multi_progress.add(ProgressBar::new(documents.len() as u64));
        folder_bar.set_style(Self::bar_style("files"));

        let mut failures = 0usize;
        for document in &documents {
            folder_bar.set_message(
                document
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
            if let Err(e) = self
                .run_with_progress(
                    document.clone(),
                    output_dir.clone(),
                    &multi_progress,
                    force_overwrite,
                )
                .await
            {
                warn!("Failed to translate {:?}: {}", document, e);
                failures += 1;
            }
            folder_bar.inc(1);
        }
        folder_bar.finish_and_clear();

        if failures > 0 {
            return Err(anyhow!(
                "{} of {} documents failed to translate",
                failures,
                documents.len()
            ));
        }
        info!("Folder translation complete: {} documents", documents.len());
        Ok(())
    }

    async fn run_with_progress(
        &self,
        input_file: PathBuf,
        output_dir: PathBuf,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<()> {
        let start_time = std::time::Instant::now();

        if !FileManager::file_exists(&input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        if !FileManager::is_docx(&input_file) {
            return Err(anyhow!("Not a supported document: {:?}", input_file));
        }
        FileManager::ensure_dir(&output_dir)?;

        let output_path = FileManager::generate_output_path(
            &input_file,
            &output_dir,
            &self.config.target_language,
        )?;
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, translation already exists (use -f to force overwrite)");
            return Ok(());
        }

        let package = DocxPackage::read(&input_file)
            .with_context(|| format!("Failed to open document: {:?}", input_file))?;

        let pipeline = self.build_pipeline();
        let job = TranslationJob::new();

        let progress_bar = multi_progress.add(ProgressBar::new(0));
        progress_bar.set_style(Self::bar_style("units"));

        let bar = progress_bar.clone();
        let outcome = pipeline
            .run(&package, &job, move |done, total| {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
            })
            .await
            .with_context(|| format!("Translation failed for {:?}", input_file))?;
        progress_bar.finish_and_clear();

        let Some(translated_package) = outcome.package else {
            warn!("Translation of {:?} was cancelled, no output written", input_file);
            return Ok(());
        };

        FileManager::write_package(&translated_package, &output_path)?;

        let report = outcome.report;
        info!(
            "Translated {:?} -> {:?}: {}/{} units in {}",
            input_file,
            output_path,
            report.translated_units,
            report.total_units,
            Self::format_duration(start_time.elapsed())
        );
        if report.is_degraded() {
            warn!(
                "{} units kept their original text (see log for reasons)",
                report.degraded_units.len()
            );
        }
        if report.fixes_applied > 0 {
            info!("Applied {} format fixes after reconstruction", report.fixes_applied);
        }

        Ok(())
    }

    fn build_pipeline(&self) -> TranslationPipeline {
        match &self.provider_override {
            Some(provider) => {
                TranslationPipeline::with_provider(self.config.clone(), provider.clone())
            }
            None => TranslationPipeline::new(self.config.clone()),
        }
    }

    fn bar_style(noun: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
                noun
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    fn format_duration(duration: std::time::Duration) -> String {
        let total_secs = duration.as_secs();
        if total_secs >= 60 {
            format!("{}m{:02}s", total_secs / 60, total_secs % 60)
        } else {
            format!("{}.{:01}s", total_secs, duration.subsec_millis() / 100)
        }
    }
}
