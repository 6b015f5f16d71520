//! Tests for the export pipeline

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::config::DedupConfig;
    use crate::error::ExportError;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    fn sample_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join("sample.ds")
    }

    fn sample_text() -> String {
        fs::read_to_string(sample_path()).unwrap()
    }

    fn read_json(dir: &Path, kind: EntityKind) -> Vec<Value> {
        let text = fs::read_to_string(dir.join(kind.file_name())).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    fn export_sample(dir: &Path) -> ExportSummary {
        export_all(&sample_path(), dir, ExportConfig::default()).unwrap()
    }

    #[test]
    fn test_full_export_writes_every_file() {
        let temp_dir = TempDir::new().unwrap();
        let summary = export_sample(temp_dir.path());

        assert_eq!(summary.files.len(), 9);
        for kind in EntityKind::ALL {
            assert!(temp_dir.path().join(kind.file_name()).is_file(), "missing {}", kind.file_name());
        }

        let count = |kind: EntityKind| summary.files.iter().find(|f| f.kind == kind).unwrap().count;
        assert_eq!(count(EntityKind::Forms), 4);
        assert_eq!(count(EntityKind::FormFields), 9);
        assert_eq!(count(EntityKind::Reports), 3);
        assert_eq!(count(EntityKind::ReportFields), 7);
        assert_eq!(count(EntityKind::FormWorkflows), 2);
        assert_eq!(count(EntityKind::ReportWorkflows), 2);
        assert_eq!(count(EntityKind::Functions), 2);
        assert_eq!(count(EntityKind::Pages), 3);
        assert_eq!(count(EntityKind::PageComponents), 3);
    }

    #[test]
    fn test_export_is_deterministic() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        export_sample(first.path());
        export_sample(second.path());

        for kind in EntityKind::ALL {
            let a = fs::read(first.path().join(kind.file_name())).unwrap();
            let b = fs::read(second.path().join(kind.file_name())).unwrap();
            assert_eq!(a, b, "{} differs between runs", kind.file_name());
        }
    }

    #[test]
    fn test_repeated_form_has_alternate_locations() {
        let temp_dir = TempDir::new().unwrap();
        export_sample(temp_dir.path());
        let forms = read_json(temp_dir.path(), EntityKind::Forms);

        let feedback: Vec<_> = forms.iter().filter(|f| f["form_name"] == "Feedback").collect();
        assert_eq!(feedback.len(), 1);
        assert_eq!(feedback[0]["form_id"], "Feedback");
        assert_eq!(feedback[0]["container"], "page Home");
        let alternates = feedback[0]["alternate_locations"].as_array().unwrap();
        assert_eq!(alternates.len(), 1);
        assert_eq!(alternates[0]["container"], "page About");
    }

    #[test]
    fn test_two_pages_reference_one_form() {
        let temp_dir = TempDir::new().unwrap();
        export_sample(temp_dir.path());
        let pages = read_json(temp_dir.path(), EntityKind::Pages);

        let referencing: Vec<_> = pages
            .iter()
            .filter(|p| p["form_refs"].as_array().unwrap().iter().any(|r| r == "Feedback"))
            .map(|p| p["page_name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(referencing, vec!["Home".to_string(), "About".to_string()]);

        let home = &pages[0];
        assert_eq!(home["form_refs"], serde_json::json!(["Feedback", "Orders"]));
        assert_eq!(home["has_content"], true);
    }

    #[test]
    fn test_field_form_ids_resolve() {
        let temp_dir = TempDir::new().unwrap();
        export_sample(temp_dir.path());
        let forms = read_json(temp_dir.path(), EntityKind::Forms);
        let fields = read_json(temp_dir.path(), EntityKind::FormFields);

        let ids: Vec<_> = forms.iter().map(|f| f["form_id"].clone()).collect();
        for field in &fields {
            assert!(ids.contains(&field["form_id"]), "dangling form_id {}", field["form_id"]);
        }

        let customer = fields
            .iter()
            .find(|f| f["form_name"] == "Orders" && f["field_name"] == "Customer")
            .unwrap();
        assert_eq!(customer["required"], true);
        assert_eq!(customer["lookup_details"]["form"], "Customer");
        assert_eq!(customer["type"], "picklist");
    }

    #[test]
    fn test_form_nested_deeper_in_page_collapses() {
        let temp_dir = TempDir::new().unwrap();
        export_sample(temp_dir.path());
        let forms = read_json(temp_dir.path(), EntityKind::Forms);

        let notes: Vec<_> = forms.iter().filter(|f| f["form_name"] == "Note").collect();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0]["form_id"], "Note");
        assert_eq!(notes[0]["container"], "forms");
        let alternates = notes[0]["alternate_locations"].as_array().unwrap();
        assert_eq!(alternates.len(), 1);
        assert_eq!(alternates[0]["container"], "page Notes");

        let pages = read_json(temp_dir.path(), EntityKind::Pages);
        let notes_page = pages.iter().find(|p| p["page_name"] == "Notes").unwrap();
        assert_eq!(notes_page["form_refs"], serde_json::json!(["Note"]));
    }

    #[test]
    fn test_whitespace_variants() {
        let text = "forms\n{\n\tform Note\n\t{\n\t\tText\n\t\t(\n\t\t\ttype = textarea\n\t\t)\n\t}\n}\n\
                    pages\n{\n\tpage Notes\n\t{\n\t\tform Note\n\t\t{\n\t\t\tText\n\t\t\t(\n\t\t\t\ttype  =  textarea\n\t\t\t)\n\t\t}\n\t}\n}\n";

        let strict = Exporter::new(ExportConfig::default()).extract(SourceText::new("app.ds", text)).unwrap();
        let ids: Vec<_> = strict.forms.iter().map(|f| f.form_id.as_str()).collect();
        assert_eq!(ids, vec!["Note", "Note~2"]);

        let config = ExportConfig { dedup: DedupConfig { ignore_whitespace: true }, ..ExportConfig::default() };
        let loose = Exporter::new(config).extract(SourceText::new("app.ds", text)).unwrap();
        assert_eq!(loose.forms.len(), 1);
        assert_eq!(loose.forms[0].alternate_locations.len(), 1);
        assert_eq!(loose.forms[0].alternate_locations[0].container, "page Notes");
    }

    #[test]
    fn test_workflow_code_survives_json() {
        let temp_dir = TempDir::new().unwrap();
        export_sample(temp_dir.path());
        let workflows = read_json(temp_dir.path(), EntityKind::FormWorkflows);

        let validate = workflows.iter().find(|w| w["workflow_name"] == "Validate_Order").unwrap();
        let script = validate["events"][0]["actions"][0]["script"].as_str().unwrap();
        assert!(script.contains("alert \"Quantity must be \\\"positive\\\" – ø\";"));
        assert!(script.contains('\n'));
        assert!(sample_text().contains(script));

        let full_source = validate["full_source"].as_str().unwrap();
        assert!(sample_text().contains(full_source));
    }

    #[test]
    fn test_forms_link_workflows() {
        let temp_dir = TempDir::new().unwrap();
        export_sample(temp_dir.path());
        let forms = read_json(temp_dir.path(), EntityKind::Forms);
        let orders = forms.iter().find(|f| f["form_name"] == "Orders").unwrap();
        assert_eq!(orders["workflows"], serde_json::json!(["Validate_Order", "Set_Total"]));
        assert_eq!(orders["scripts"][0]["trigger"], "load");
    }

    #[test]
    fn test_function_positions_slice_source() {
        let temp_dir = TempDir::new().unwrap();
        export_sample(temp_dir.path());
        let functions = read_json(temp_dir.path(), EntityKind::Functions);
        let text = sample_text();

        let receipt = &functions[0];
        assert_eq!(receipt["namespace"], "notifications");
        assert_eq!(receipt["name"], "send_receipt");
        let start = receipt["body_start"].as_u64().unwrap() as usize;
        let end = receipt["body_end"].as_u64().unwrap() as usize;
        assert_eq!(&text[start..end], receipt["body"].as_str().unwrap());
        assert_eq!(functions[1]["parameters"], serde_json::json!([{ "type": "decimal", "name": "amount" }]));
    }

    #[test]
    fn test_single_entity_export() {
        let temp_dir = TempDir::new().unwrap();
        let summary =
            export_entity(EntityKind::Reports, &sample_path(), temp_dir.path(), ExportConfig::default()).unwrap();
        assert_eq!(summary.files.len(), 1);
        assert_eq!(summary.files[0].count, 3);

        let written: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(written.len(), 1);
    }

    #[test]
    fn test_malformed_input_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("broken.ds");
        let truncated: Vec<_> = sample_text().lines().take(120).map(str::to_string).collect();
        fs::write(&input, truncated.join("\n")).unwrap();
        let out_dir = temp_dir.path().join("out");

        let err = export_all(&input, &out_dir, ExportConfig::default()).unwrap_err();
        assert!(matches!(err, ExportError::Parse(_)));
        let leftovers = fs::read_dir(&out_dir).map(|entries| entries.count()).unwrap_or(0);
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let err = export_all(&temp_dir.path().join("nope.ds"), temp_dir.path(), ExportConfig::default()).unwrap_err();
        assert!(matches!(err, ExportError::InputNotFound { .. }));
    }

    #[test]
    fn test_missing_output_directory_without_create() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = ExportConfig::default();
        config.output.create_dir = false;
        let err = export_all(&sample_path(), &temp_dir.path().join("absent"), config).unwrap_err();
        assert!(matches!(err, ExportError::OutputWrite { .. }));
    }

    #[test]
    fn test_bom_shifts_positions() {
        let text = sample_text();
        let plain = Exporter::new(ExportConfig::default()).extract(SourceText::new("a.ds", text.clone())).unwrap();
        let with_bom = Exporter::new(ExportConfig::default())
            .extract(SourceText::new("a.ds", format!("\u{feff}{text}")))
            .unwrap();

        assert_eq!(with_bom.functions[0].body_start, plain.functions[0].body_start + 3);
        assert_eq!(with_bom.forms[0].provenance.start_line, plain.forms[0].provenance.start_line);
    }
}
