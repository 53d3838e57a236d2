/* Command Line Tests
 *
 * Runs the built hdi-gen binary against declaration files in a temporary
 * directory and checks the files and reports it produces.
 */

use hdi_gen::codegen::{CodeGenerator, CodegenOptions, Dialect, Language};
use hdi_types::TypesFile;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const SAMPLE: &str = r#"
package: "ohos.hdi.sample"
types:
  - struct:
      name: "Sample"
      fields:
        - name: "values"
          field-type:
            list:
              element-type: uint
        - name: "label"
          field-type: string
  - enum:
      name: "Mode"
      members:
        - name: "MODE_A"
          value: 0
        - name: "MODE_B"
"#;

fn write_sample(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("sample.yaml");
    fs::write(&path, content).expect("write declaration file");
    path
}

fn hdi_gen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hdi-gen"))
        .args(args)
        .output()
        .expect("run hdi-gen")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_codegen_writes_package_directory() {
    let temp = TempDir::new().unwrap();
    let input = write_sample(temp.path(), SAMPLE);
    let out = temp.path().join("out");

    let output = hdi_gen(&[
        "codegen",
        "-f",
        input.to_str().unwrap(),
        "-l",
        "c",
        "--kernel",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let package = out.join("ohos/hdi/sample");
    let header = fs::read_to_string(package.join("types.h")).unwrap();
    let source = fs::read_to_string(package.join("types.c")).unwrap();
    assert!(header.contains("#ifndef OHOS_HDI_SAMPLE_TYPES_H"));
    assert!(header.contains("enum Mode {\n    MODE_A = 0,\n    MODE_B,\n};\n"));
    assert!(source.contains("label = (char *)OsalMemCalloc(strlen(labelCp) + 1);"));
    assert!(!source.contains("strdup("));
}

#[test]
fn test_codegen_rejects_kernel_for_cpp() {
    let temp = TempDir::new().unwrap();
    let input = write_sample(temp.path(), SAMPLE);
    let output = hdi_gen(&[
        "codegen",
        "-f",
        input.to_str().unwrap(),
        "-l",
        "cpp",
        "--kernel",
        "-o",
        temp.path().to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(!temp.path().join("ohos").exists());
}

#[test]
fn test_codegen_rejects_duplicate_declarations() {
    let temp = TempDir::new().unwrap();
    let duplicated = format!("{}  - enum:\n      name: \"Sample\"\n", SAMPLE);
    let input = write_sample(temp.path(), &duplicated);
    let output = hdi_gen(&[
        "codegen",
        "-f",
        input.to_str().unwrap(),
        "-l",
        "c",
        "-o",
        temp.path().to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("[!] Sample"));
}

#[test]
fn test_analyze_json_report() {
    let temp = TempDir::new().unwrap();
    let input = write_sample(temp.path(), SAMPLE);
    let output = hdi_gen(&["analyze", "-f", input.to_str().unwrap(), "--format", "json"]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let sample = &report["ohos.hdi.sample"][0];
    assert_eq!(sample["name"], "Sample");
    assert_eq!(sample["c_size"], 24);
    assert_eq!(sample["fields"][0]["spellings"]["C"]["ParamIn"], "const uint32_t*");
    let java = sample["fields"][0]["spellings"]["Java"]["NoMode"].as_str().unwrap();
    assert!(java.starts_with('<') && java.contains("Java"), "{}", java);
}

#[test]
fn test_fragment_reports_pending_releases() {
    let output = hdi_gen(&[
        "fragment",
        "-t",
        "list: {element-type: uint}",
        "--family",
        "stub-read-var",
        "-n",
        "values",
    ]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("if (!HdfSbufReadUint32(data, &valuesLen)) {"));
    assert!(text.contains("[~] Releases still owned by values:"));
    assert!(text.contains("    if (valuesLen > 0 && values != NULL) {"));
}

#[test]
fn test_emit_code_returns_written_paths() {
    let temp = TempDir::new().unwrap();
    let generator = CodeGenerator::new(CodegenOptions {
        output_dir: temp.path().to_string_lossy().to_string(),
        language: Language::Cpp,
        dialect: Dialect::User,
        ..CodegenOptions::default()
    });
    let file = TypesFile::from_yaml_str(SAMPLE).unwrap();
    let paths = generator.emit_code(&file).unwrap();

    let package = temp.path().join("ohos/hdi/sample");
    assert_eq!(paths, vec![package.join("types.h"), package.join("types.cpp")]);
    assert!(paths.iter().all(|path| path.is_file()));
}
