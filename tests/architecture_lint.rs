//! Architecture enforcement lint - keeps the bootstrap core independent of the
//! render layer and funnels identity configuration through one call site.
//!
//! The core modules (bootstrap, bus, config, identity, theme) must build for
//! any target, so they may not reach for the UI framework or browser bindings.
//! Those live under `src/app/`.
//!
//! The identity client must be configured exactly once per load. Only the
//! auth controller is allowed to call `configure(` on it; everything else goes
//! through `AuthController::initialize`.

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Directories under src/ that make up the platform-independent core
const CORE_DIRS: &[&str] = &["bootstrap", "bus", "config", "identity", "theme"];

/// Imports that belong to the render layer
const RENDER_LAYER_PATTERNS: &[(&str, &str)] = &[
    ("dioxus::", "Move UI code under src/app/"),
    ("web_sys::", "Wrap browser APIs in a trait implemented under src/app/"),
    (
        "wasm_bindgen",
        "Wrap browser APIs in a trait implemented under src/app/",
    ),
];

/// Files allowed to call `configure(` on an identity client outside tests
const CONFIGURE_CALL_SITES: &[&str] = &["bootstrap/auth.rs"];

/// Production part of a source file (everything before the test module)
fn production_code(content: &str) -> &str {
    let end = ["#[cfg(test)]", "#[cfg(all(test"]
        .iter()
        .filter_map(|marker| content.find(marker))
        .min()
        .unwrap_or(content.len());
    &content[..end]
}

fn rust_files(dir: &Path) -> Vec<std::path::PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| e.into_path())
        .collect()
}

fn line_of(content: &str, pos: usize) -> usize {
    content[..pos].matches('\n').count() + 1
}

fn report(title: &str, violations: &[String]) -> String {
    let mut msg = format!("\n\n{}\n\n", title);
    for v in violations {
        msg.push_str(&format!("  {}\n", v));
    }
    msg
}

#[test]
fn core_modules_do_not_import_render_layer() {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut violations = Vec::new();

    for dir in CORE_DIRS {
        for path in rust_files(&src_dir.join(dir)) {
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            for (pattern, suggestion) in RENDER_LAYER_PATTERNS {
                for (pos, _) in content.match_indices(pattern) {
                    violations.push(format!(
                        "{}:{} uses `{}` ({})",
                        path.display(),
                        line_of(&content, pos),
                        pattern,
                        suggestion
                    ));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "{}",
        report("Core modules must not depend on the render layer:", &violations)
    );
}

#[test]
fn identity_client_configured_only_by_auth_controller() {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut violations = Vec::new();

    for path in rust_files(&src_dir) {
        let path_str = path.display().to_string().replace('\\', "/");
        if CONFIGURE_CALL_SITES.iter().any(|allowed| path_str.ends_with(allowed)) {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let code = production_code(&content);
        for (pos, _) in code.match_indices(".configure(") {
            violations.push(format!("{}:{}", path_str, line_of(code, pos)));
        }
    }

    assert!(
        violations.is_empty(),
        "{}",
        report(
            "Identity client configured outside AuthController::initialize:",
            &violations
        )
    );
}

#[test]
fn core_modules_propagate_errors() {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut violations = Vec::new();

    for dir in CORE_DIRS {
        for path in rust_files(&src_dir.join(dir)) {
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            let code = production_code(&content);
            for pattern in [".unwrap()", ".expect("] {
                for (pos, _) in code.match_indices(pattern) {
                    violations.push(format!(
                        "{}:{} `{}`",
                        path.display(),
                        line_of(code, pos),
                        pattern
                    ));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "{}",
        report("Panicking calls in core modules:", &violations)
    );
}
