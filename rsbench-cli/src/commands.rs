// CLI command handlers
use crate::settings::BenchSettings;
use crate::timing::timed;
use crate::toolchain::{Compiler, RecoveryTool};
use anyhow::{Context, Result};
use rsbench_core::benchmark::emitter::Emitter;
use rsbench_core::benchmark::fingerprint::{evaluate, Evaluation};
use rsbench_core::benchmark::generator::generate_program;
use rsbench_core::benchmark::model::{Program, StructGraph};
use rsbench_core::benchmark::recovered::{parse_recovered, stat_header};
use std::fs;
use std::path::Path;

/// Generate a program, write its source and its ground-truth struct graph.
pub fn generate(settings: &BenchSettings) -> Result<Program> {
    let program = generate_program(
        settings.struct_count,
        settings.func_count,
        settings.generator.clone(),
    )?;

    let preamble = match &settings.preamble {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read preamble: {}", path.display()))?,
        ),
        None => None,
    };
    let mut emitter = Emitter::new(&program);
    if let Some(preamble) = preamble.as_deref() {
        emitter = emitter.with_preamble(preamble);
    }
    let source = emitter.emit();

    fs::write(&settings.source, source)
        .with_context(|| format!("Failed to write source: {}", settings.source.display()))?;
    write_ground_truth(&settings.ground_truth(), &program.structs)?;

    println!(
        "Generated {} structs and {} functions into {}",
        program.structs.len(),
        program.callable_functions().count(),
        settings.source.display()
    );
    Ok(program)
}

/// Compile the generated source with the configured compiler.
pub fn build(settings: &BenchSettings) -> Result<()> {
    let compiler = Compiler::locate(&settings.compiler)?;
    compiler.compile(&settings.source, &settings.binary)
}

/// Run the recovery tool on the built binary and keep its output.
pub fn recover(settings: &BenchSettings) -> Result<String> {
    let tool = RecoveryTool::locate(&settings.recovery_tool)?;
    let recovered = tool.recover(&settings.binary)?;
    fs::write(&settings.recovered, &recovered).with_context(|| {
        format!(
            "Failed to write recovered model: {}",
            settings.recovered.display()
        )
    })?;

    for line in stat_header(&recovered) {
        log::info!("> {}", line);
    }
    Ok(recovered)
}

/// Score the recovered model against the ground truth.
///
/// Uses `ground_truth` when given, otherwise the JSON written by [`generate`].
pub fn evaluate_recovery(
    settings: &BenchSettings,
    ground_truth: Option<&StructGraph>,
) -> Result<Evaluation> {
    let text = fs::read_to_string(&settings.recovered).with_context(|| {
        format!(
            "Failed to read recovered model: {}",
            settings.recovered.display()
        )
    })?;
    let recovered = parse_recovered(&text).with_context(|| {
        format!(
            "Failed to parse recovered model: {}",
            settings.recovered.display()
        )
    })?;

    let evaluation = match ground_truth {
        Some(generated) => evaluate(generated, &recovered)?,
        None => evaluate(&read_ground_truth(&settings.ground_truth())?, &recovered)?,
    };
    Ok(evaluation)
}

/// Full pipeline: generate, build, recover, evaluate.
pub fn run(settings: &BenchSettings) -> Result<Evaluation> {
    let program = timed("Generating test data", || generate(settings))?;
    timed("Building rs-bench", || build(settings))?;
    timed("Recovering structs", || recover(settings))?;
    timed("Evaluating", || evaluate_recovery(settings, Some(&program.structs)))
}

/// Print an evaluation as `recovered,garbage` or as JSON.
pub fn report(evaluation: &Evaluation, json: bool) -> Result<()> {
    if json {
        let text =
            serde_json::to_string_pretty(evaluation).context("Failed to serialize evaluation")?;
        println!("{}", text);
    } else {
        println!("{},{}", evaluation.recovered_ratio, evaluation.garbage_ratio);
    }
    Ok(())
}

fn write_ground_truth(path: &Path, graph: &StructGraph) -> Result<()> {
    let json = serde_json::to_string_pretty(graph).context("Failed to serialize ground truth")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write ground truth: {}", path.display()))
}

/// Load a ground-truth struct graph written by [`generate`].
pub fn read_ground_truth(path: &Path) -> Result<StructGraph> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read ground truth: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse ground truth: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn settings_in(dir: &Path) -> BenchSettings {
        BenchSettings {
            struct_count: 12,
            func_count: 5,
            source: dir.join("bench.cxx"),
            binary: dir.join("bench"),
            recovered: dir.join("recovered.hxx"),
            ..BenchSettings::default()
        }
    }

    #[test]
    fn test_generate_writes_ground_truth() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());

        let program = generate(&settings).unwrap();
        assert!(settings.source.exists());
        assert_eq!(settings.ground_truth(), dir.path().join("bench.json"));

        let ground_truth = read_ground_truth(&settings.ground_truth()).unwrap();
        assert_eq!(ground_truth, program.structs);
    }

    #[test]
    fn test_evaluate_against_stored_ground_truth() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());
        let program = generate(&settings).unwrap();

        let mut emitter = Emitter::new(&program);
        let listing: String = program
            .structs
            .iter()
            .map(|s| emitter.emit_struct(s))
            .collect();
        fs::write(&settings.recovered, format!("// 12 structs\n{}", listing)).unwrap();

        let evaluation = evaluate_recovery(&settings, None).unwrap();
        assert_eq!(evaluation.recovered_ratio, 1.0);
        assert_eq!(evaluation.garbage_ratio, 0.0);
        assert_eq!(evaluation.matched, evaluation.generated);
        assert!(evaluation.generated > 0 && evaluation.generated <= 12);
    }

    #[test]
    fn test_malformed_ground_truth() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());
        fs::write(settings.ground_truth(), "{ \"structs\": [ }").unwrap();
        fs::write(&settings.recovered, "struct a {\n    int8_t _0;\n};\n").unwrap();

        let error = read_ground_truth(&settings.ground_truth()).unwrap_err();
        assert!(error.to_string().starts_with("Failed to parse ground truth"));
        assert!(evaluate_recovery(&settings, None).is_err());
    }

    #[test]
    fn test_missing_ground_truth() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());
        fs::write(&settings.recovered, "struct a {\n    int8_t _0;\n};\n").unwrap();

        let error = evaluate_recovery(&settings, None).unwrap_err();
        assert!(error.to_string().starts_with("Failed to read ground truth"));
    }

    #[test]
    fn test_malformed_recovered_model() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());
        generate(&settings).unwrap();
        fs::write(&settings.recovered, "};\n").unwrap();

        let error = evaluate_recovery(&settings, None).unwrap_err();
        assert!(error.to_string().starts_with("Failed to parse recovered model"));
    }
}
