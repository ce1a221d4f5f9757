use std::path::PathBuf;

use crate::config::EngineConfig;
use crate::diagnosis::RejectedRecord;
use crate::diagnosis::store::DiagnosisRecordStore;
use crate::eval::AggregateReport;
use crate::input::ScoreCase;
use crate::schema::v1::DxEvalV1;
use crate::taxonomy::ConditionTaxonomy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Synthetic { rounds: usize, seed: u64 },
}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub json_path: PathBuf,
    pub tsv_path: PathBuf,
    pub report_path: PathBuf,
}

/// State for one evaluation run, threaded through the pipeline stages.
#[derive(Debug)]
pub struct Ctx {
    pub source: InputSource,
    pub config: EngineConfig,
    pub taxonomy: ConditionTaxonomy,
    pub write_json: bool,
    pub write_tsv: bool,
    pub write_report: bool,
    pub tool_version: String,
    pub warnings: Vec<String>,
    pub cases: Vec<ScoreCase>,
    pub store: DiagnosisRecordStore,
    pub rejected: Vec<RejectedRecord>,
    pub aggregate: Option<AggregateReport>,
    pub output: OutputPaths,
    pub report: Option<DxEvalV1>,
}

impl Ctx {
    pub fn new(
        source: InputSource,
        out_dir: PathBuf,
        config: EngineConfig,
        taxonomy: ConditionTaxonomy,
        write_json: bool,
        write_tsv: bool,
        write_report: bool,
        tool_version: &str,
    ) -> Self {
        let json_path = out_dir.join("dxeval.json");
        let tsv_path = out_dir.join("dxeval.tsv");
        let report_path = out_dir.join("dxeval_report.txt");
        Self {
            source,
            config,
            taxonomy,
            write_json,
            write_tsv,
            write_report,
            tool_version: tool_version.to_string(),
            warnings: Vec::new(),
            cases: Vec::new(),
            store: DiagnosisRecordStore::new(),
            rejected: Vec::new(),
            aggregate: None,
            output: OutputPaths {
                out_dir,
                json_path,
                tsv_path,
                report_path,
            },
            report: None,
        }
    }

    pub fn writes_any_output(&self) -> bool {
        self.write_json || self.write_tsv || self.write_report
    }
}
