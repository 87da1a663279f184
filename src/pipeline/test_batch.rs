use super::*;
use crate::automation::CaptureRegion;
use crate::automation::scripted::{Call, ScriptedBackend};
use crate::gate::ImmediateGate;
use crate::settings::Timing;
use crossbeam_channel::unbounded;
use image::Luma;

fn scripted_settings() -> Settings {
    Settings {
        timing: Timing::immediate(),
        save_debug_artifacts: false,
        ..Settings::default()
    }
}

/// Blank canvas, then the same canvas with a name rendered in the middle.
fn push_frames(backend: &mut ScriptedBackend) {
    let before = GrayImage::from_pixel(400, 300, Luma([255]));
    let mut after = before.clone();
    for y in 140..160 {
        for x in 180..220 {
            after.put_pixel(x, y, Luma([0]));
        }
    }
    backend.frames.push_back(before);
    backend.frames.push_back(after);
}

fn write_input(dir: &Path, lines: &str) -> PathBuf {
    let path = dir.join("molecules.txt");
    std::fs::write(&path, lines).unwrap();
    path
}

#[test]
fn batch_writes_one_record_per_line_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "CCO\n\n  CC(=O)O  \nc1ccccc1\n");

    let mut backend = ScriptedBackend::new();
    for name in ["ethanol", "acetic acid", "benzene"] {
        push_frames(&mut backend);
        backend.reads.push_back(name.to_string());
    }
    let (tx, rx) = unbounded();

    let output =
        run_batch(&mut backend, &ImmediateGate, &scripted_settings(), &input, &tx).unwrap();

    assert_eq!(output, dir.path().join("molecules.txt.json"));
    let records: Vec<DrawingRecord> =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        records,
        vec![
            DrawingRecord { smiles: "CCO".into(), iupac_name: "ethanol".into() },
            DrawingRecord { smiles: "CC(=O)O".into(), iupac_name: "acetic acid".into() },
            DrawingRecord { smiles: "c1ccccc1".into(), iupac_name: "benzene".into() },
        ]
    );

    let progress: Vec<BatchEvent> = rx
        .try_iter()
        .filter(|e| matches!(e, BatchEvent::Progress { .. }))
        .collect();
    assert_eq!(progress.last(), Some(&BatchEvent::Progress { done: 3, total: 3 }));
}

#[test]
fn one_molecule_follows_the_drawing_sequence() {
    let mut backend = ScriptedBackend::new();
    push_frames(&mut backend);
    backend.reads.push_back("ethanol".to_string());
    let settings = scripted_settings();

    let record = DrawingWorkflow::new(&mut backend, &settings).draw("CCO").unwrap();
    assert_eq!(record.iupac_name, "ethanol");

    let clicks = backend.clicks();
    assert_eq!(clicks.len(), 1);
    assert_eq!(
        backend.calls,
        vec![
            Call::Write("CCO".into()),
            Call::Keys("command+v".into()),
            Call::Capture("afterpaste".into()),
            Call::Keys("option+command+n".into()),
            Call::Capture("afterstart".into()),
            Call::Click(clicks[0].0, clicks[0].1),
            Call::Keys("command+c".into()),
            Call::Read,
            Call::Keys("command+a".into()),
            Call::Keys("backspace".into()),
        ]
    );
    // The click lands on the rendered name.
    assert!((clicks[0].0 as i64 - 200).abs() <= 49);
    assert!((clicks[0].1 as i64 - 150).abs() <= 49);
}

#[test]
fn debug_runs_capture_the_canvas_before_pasting() {
    let mut backend = ScriptedBackend::new();
    backend.frames.push_back(GrayImage::from_pixel(400, 300, Luma([255])));
    push_frames(&mut backend);
    backend.reads.push_back("ethanol".to_string());
    let settings = Settings {
        save_debug_artifacts: true,
        ..scripted_settings()
    };

    let record = DrawingWorkflow::new(&mut backend, &settings).draw("CCO").unwrap();
    assert_eq!(record.iupac_name, "ethanol");

    let captures: Vec<&Call> = backend
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Capture(_)))
        .collect();
    assert_eq!(
        captures,
        vec![
            &Call::Capture("beforepaste".into()),
            &Call::Capture("afterpaste".into()),
            &Call::Capture("afterstart".into()),
        ]
    );
    assert_eq!(
        &backend.calls[..2],
        &[Call::Write("CCO".into()), Call::Capture("beforepaste".into())]
    );
}

#[test]
fn wildcard_is_drawn_as_gas_and_restored_in_name() {
    let mut backend = ScriptedBackend::new();
    push_frames(&mut backend);
    backend.reads.push_back("2-heliumylethan-1-ol".to_string());
    let settings = scripted_settings();

    let record = DrawingWorkflow::new(&mut backend, &settings).draw("*CCO").unwrap();

    assert_eq!(backend.calls[0], Call::Write("[He]CCO".into()));
    assert_eq!(record.smiles, "*CCO");
    assert_eq!(record.iupac_name, "2-[Chemical_bond]ylethan-1-ol");
}

#[test]
fn unchanged_clipboard_is_propagated_by_default() {
    let mut backend = ScriptedBackend::new();
    push_frames(&mut backend);
    let settings = scripted_settings();

    let record = DrawingWorkflow::new(&mut backend, &settings).draw("CCO").unwrap();
    assert_eq!(record.iupac_name, "CCO");
    assert_eq!(backend.copies(), 3);
}

#[test]
fn unchanged_clipboard_can_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "CCO\n");
    let mut backend = ScriptedBackend::new();
    push_frames(&mut backend);
    let settings = Settings {
        fail_on_unverified: true,
        ..scripted_settings()
    };
    let (tx, _rx) = unbounded();

    let err = run_batch(&mut backend, &ImmediateGate, &settings, &input, &tx).unwrap_err();
    assert!(err.chain().any(|e| e.to_string().contains("No copied value differed")));
    assert!(!output_path(&input).exists());
}

#[test]
fn capture_failure_aborts_without_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "CCO\nCCC\n");
    let mut backend = ScriptedBackend::new();
    // Frames for the first molecule only.
    push_frames(&mut backend);
    backend.reads.push_back("ethanol".to_string());
    let (tx, _rx) = unbounded();

    let err =
        run_batch(&mut backend, &ImmediateGate, &scripted_settings(), &input, &tx).unwrap_err();
    assert!(format!("{:#}", err).contains("Molecule 2 of 2"));
    assert!(!output_path(&input).exists());
}

#[test]
fn missing_input_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = ScriptedBackend::new();
    let (tx, _rx) = unbounded();
    let result = run_batch(
        &mut backend,
        &ImmediateGate,
        &scripted_settings(),
        &dir.path().join("absent.txt"),
        &tx,
    );
    assert!(result.is_err());
    assert!(backend.calls.is_empty());
}

#[test]
fn parse_skips_blank_lines() {
    assert_eq!(parse_smiles("C\n\n \t\nCC\r\nCCC"), vec!["C", "CC", "CCC"]);
}

#[test]
fn output_is_indented_with_four_spaces() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");
    write_records(
        &path,
        &[DrawingRecord { smiles: "C".into(), iupac_name: "methane".into() }],
    )
    .unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "[\n    {\n        \"smiles\": \"C\",\n        \"iupac_name\": \"methane\"\n    }\n]"
    );
}

#[test]
fn clicks_are_translated_out_of_the_capture_region() {
    let mut full = ScriptedBackend::new();
    push_frames(&mut full);
    full.reads.push_back("ethanol".to_string());
    DrawingWorkflow::new(&mut full, &scripted_settings()).draw("CCO").unwrap();

    let mut cropped = ScriptedBackend::new();
    push_frames(&mut cropped);
    cropped.reads.push_back("ethanol".to_string());
    let settings = Settings {
        capture_region: Some(CaptureRegion { x: 100, y: 50, width: 400, height: 300 }),
        ..scripted_settings()
    };
    DrawingWorkflow::new(&mut cropped, &settings).draw("CCO").unwrap();

    let (x, y) = full.clicks()[0];
    assert_eq!(cropped.clicks(), vec![(x + 100, y + 50)]);
}
