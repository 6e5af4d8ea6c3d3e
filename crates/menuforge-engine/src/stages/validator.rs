use crate::routes::{category_route, declared_routes, standard_routes};
use crate::stage::Stage;
use async_trait::async_trait;
use menuforge_model::{
    CodeArtifact, DesignSpec, Issue, StageId, StructuredMenu, ValidationReport,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::convert::Infallible;
use std::path::{Component, Path};
use tracing::info;

/// Relative module specifiers in `import ... from './x'`,
/// `require('./x')` and bare side-effect `import './x'` forms.
static RELATIVE_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:from\s+|require\(\s*|import\s+)["'](\.{1,2}/[^"']+)["']"#)
        .expect("import regex")
});

/// Route paths declared outside the menu's required set that are still
/// expected of a restaurant site.
const COMMON_ROUTES: &[&str] = &["/", "/about", "/contact", "/menu"];

/// Suffixes the resolver tries for an extensionless relative import.
const RESOLVE_SUFFIXES: &[&str] = &["", ".js", ".jsx", ".css", ".json", "/index.js", "/index.jsx"];

const KNOWN_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "css", "json", "html", "svg", "md", "txt", "ico",
];

/// Final stage: static checks over the generated artifact.
///
/// The validator never fails; it always produces a report. Blocking
/// findings drive the regeneration loop, warnings are recorded but never
/// block completion.
pub struct Validator;

pub struct ValidatorInput {
    pub artifact: CodeArtifact,
    pub menu: StructuredMenu,
    pub design: DesignSpec,
}

#[async_trait]
impl Stage for Validator {
    type Input = ValidatorInput;
    type Output = ValidationReport;
    type Error = Infallible;

    fn id(&self) -> StageId {
        StageId::Validating
    }

    async fn run(&self, input: ValidatorInput) -> Result<ValidationReport, Infallible> {
        let report = validate(&input.artifact, &input.menu, &input.design);
        info!(
            blocking = report.blocking_count(),
            warnings = report.warning_count(),
            "validated artifact"
        );
        Ok(report)
    }
}

#[must_use]
pub fn validate(
    artifact: &CodeArtifact,
    menu: &StructuredMenu,
    _design: &DesignSpec,
) -> ValidationReport {
    let mut issues = Vec::new();

    // Constructor-checked artifacts always pass; this catches artifacts
    // rebuilt from stored records.
    if let Err(error) = artifact.verify() {
        issues.push(Issue::blocking(&artifact.entry_point, error.to_string()));
    }
    check_files(artifact, &mut issues);
    check_imports(artifact, &mut issues);
    check_routes(artifact, menu, &mut issues);

    ValidationReport::new(issues)
}

fn check_files(artifact: &CodeArtifact, issues: &mut Vec<Issue>) {
    for (path, content) in &artifact.files {
        if content.trim().is_empty() {
            issues.push(Issue::warning(path, "file is empty"));
            continue;
        }
        match extension(path) {
            Some("json") => {
                if let Err(e) = serde_json::from_str::<serde_json::Value>(content) {
                    issues.push(Issue::blocking(path, format!("invalid JSON: {e}")));
                }
            }
            Some("js" | "jsx" | "ts" | "tsx" | "css") => {
                if let Some(detail) = unbalanced_delimiters(content) {
                    issues.push(Issue::blocking(path, detail));
                }
            }
            Some(ext) if KNOWN_EXTENSIONS.contains(&ext) => {}
            _ => {
                issues.push(Issue::warning(path, "unrecognized file extension"));
            }
        }
    }
}

fn check_imports(artifact: &CodeArtifact, issues: &mut Vec<Issue>) {
    for (path, content) in &artifact.files {
        if !matches!(extension(path), Some("js" | "jsx" | "ts" | "tsx")) {
            continue;
        }
        for captures in RELATIVE_IMPORT.captures_iter(content) {
            let spec = &captures[1];
            if !resolves(artifact, path, spec) {
                issues.push(Issue::blocking(
                    path,
                    format!("unresolved relative import '{spec}'"),
                ));
            }
        }
    }
}

fn check_routes(artifact: &CodeArtifact, menu: &StructuredMenu, issues: &mut Vec<Issue>) {
    let mut declared = Vec::new();
    for (path, content) in &artifact.files {
        if matches!(extension(path), Some("js" | "jsx" | "ts" | "tsx")) {
            declared.extend(declared_routes(content));
        }
    }

    for category in &menu.categories {
        let route = category_route(&category.name);
        if !declared.iter().any(|d| d == &route) {
            issues.push(Issue::blocking(
                &artifact.entry_point,
                format!("no route declared for category '{}' ({route})", category.name),
            ));
        }
    }

    let expected = standard_routes(menu);
    for route in &declared {
        // Parameterized and wildcard routes are out of scope for matching.
        if route.contains(':') || route.contains('*') {
            continue;
        }
        if !expected.contains(route) && !COMMON_ROUTES.contains(&route.as_str()) {
            issues.push(Issue::warning(
                &artifact.entry_point,
                format!("route '{route}' does not correspond to any menu category"),
            ));
        }
    }
}

fn extension(path: &str) -> Option<&str> {
    Path::new(path).extension().and_then(|e| e.to_str())
}

/// Whether a relative import from `from` lands on a file in the artifact,
/// trying the usual bundler resolution suffixes.
fn resolves(artifact: &CodeArtifact, from: &str, spec: &str) -> bool {
    let base = Path::new(from).parent().unwrap_or_else(|| Path::new(""));
    let Some(target) = normalize_join(base, spec) else {
        return false;
    };
    RESOLVE_SUFFIXES
        .iter()
        .any(|suffix| artifact.files.contains_key(&format!("{target}{suffix}")))
}

/// Join and normalize a relative specifier against a base directory,
/// rejecting anything that escapes the artifact root.
fn normalize_join(base: &Path, spec: &str) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    for component in base.components().chain(Path::new(spec).components()) {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.join("/"))
}

/// Scan for unbalanced brackets, skipping string literals and comments.
/// Returns a description of the first imbalance found.
fn unbalanced_delimiters(source: &str) -> Option<String> {
    let mut stack: Vec<char> = Vec::new();
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' | '`' => {
                // String literal: consume through the matching quote.
                while let Some(inner) = chars.next() {
                    if inner == '\\' {
                        chars.next();
                    } else if inner == c {
                        break;
                    }
                }
            }
            '/' => match chars.peek() {
                Some('/') => {
                    for inner in chars.by_ref() {
                        if inner == '\n' {
                            break;
                        }
                    }
                }
                Some('*') => {
                    chars.next();
                    let mut prev = ' ';
                    for inner in chars.by_ref() {
                        if prev == '*' && inner == '/' {
                            break;
                        }
                        prev = inner;
                    }
                }
                _ => {}
            },
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return Some(format!("unbalanced delimiter '{c}'"));
                }
            }
            _ => {}
        }
    }
    stack
        .last()
        .map(|open| format!("unclosed delimiter '{open}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::test_support;
    use menuforge_model::{MenuCategory, MenuItem, RestaurantInfo, Severity};
    use std::collections::BTreeMap;

    fn menu() -> StructuredMenu {
        StructuredMenu::new(
            "Trattoria",
            vec![MenuCategory {
                name: "Mains".into(),
                items: vec![MenuItem {
                    name: "Lasagna".into(),
                    description: String::new(),
                    price: 14.5,
                    tags: vec![],
                }],
            }],
            RestaurantInfo::default(),
        )
    }

    fn artifact(files: &[(&str, &str)]) -> CodeArtifact {
        let map: BTreeMap<String, String> = files
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();
        CodeArtifact::new(map, "src/index.js").unwrap()
    }

    fn good_site() -> CodeArtifact {
        artifact(&[
            ("src/index.js", "import App from './App';\nrender(App);"),
            (
                "src/App.jsx",
                r#"import './styles.css';
                   export default () => (
                     <Routes>
                       <Route path="/" element={<Home />} />
                       <Route path="/mains" element={<Mains />} />
                     </Routes>
                   );"#,
            ),
            ("src/styles.css", ":root { --primary: #8b0000; }"),
            ("package.json", r#"{"name": "site", "version": "0.1.0"}"#),
        ])
    }

    #[test]
    fn clean_artifact_passes() {
        let report = validate(&good_site(), &menu(), &test_support::design());
        assert!(report.is_clean(), "unexpected issues: {:?}", report.issues);
    }

    #[test]
    fn missing_category_route_is_blocking() {
        let site = artifact(&[
            ("src/index.js", "render();"),
            ("package.json", "{}"),
        ]);
        let report = validate(&site, &menu(), &test_support::design());
        assert!(report
            .blocking_issues()
            .any(|i| i.message.contains("'Mains'")));
    }

    #[test]
    fn invalid_json_is_blocking() {
        let site = artifact(&[
            ("src/index.js", r#"<Route path="/mains" />"#),
            ("package.json", "{not json"),
        ]);
        let report = validate(&site, &menu(), &test_support::design());
        assert!(report
            .blocking_issues()
            .any(|i| i.location == "package.json"));
    }

    #[test]
    fn unbalanced_braces_are_blocking() {
        let site = artifact(&[(
            "src/index.js",
            r#"function render() { return (<Route path="/mains" />); "#,
        )]);
        let report = validate(&site, &menu(), &test_support::design());
        assert!(report
            .blocking_issues()
            .any(|i| i.message.contains("unclosed delimiter")));
    }

    #[test]
    fn braces_inside_strings_and_comments_do_not_count() {
        assert_eq!(unbalanced_delimiters(r#"const s = "{["; // } also ("#), None);
        assert_eq!(unbalanced_delimiters("/* { */ const x = [1];"), None);
        assert!(unbalanced_delimiters("const x = [1;").is_some());
    }

    #[test]
    fn unresolved_relative_import_is_blocking() {
        let site = artifact(&[(
            "src/index.js",
            r#"import Missing from './Missing';
               <Route path="/mains" />"#,
        )]);
        let report = validate(&site, &menu(), &test_support::design());
        assert!(report
            .blocking_issues()
            .any(|i| i.message.contains("./Missing")));
    }

    #[test]
    fn bare_side_effect_import_is_resolved_too() {
        let site = artifact(&[(
            "src/index.js",
            r#"import './theme.css';
               <Route path="/mains" />"#,
        )]);
        let report = validate(&site, &menu(), &test_support::design());
        assert!(report
            .blocking_issues()
            .any(|i| i.message.contains("./theme.css")));
    }

    #[test]
    fn resolver_tries_bundler_suffixes() {
        let site = artifact(&[
            (
                "src/index.js",
                r#"import App from './App';
                   import theme from '../shared/theme.css';
                   <Route path="/mains" />"#,
            ),
            ("src/App.jsx", "export default 1;"),
            ("shared/theme.css", "body {}"),
        ]);
        let report = validate(&site, &menu(), &test_support::design());
        assert!(report.blocking_count() == 0, "{:?}", report.issues);
    }

    #[test]
    fn empty_and_unknown_files_are_warnings() {
        let site = artifact(&[
            ("src/index.js", r#"<Route path="/mains" />"#),
            ("src/blank.css", "   "),
            ("assets/logo.bin", "binary"),
        ]);
        let report = validate(&site, &menu(), &test_support::design());
        assert_eq!(report.blocking_count(), 0);
        let warnings: Vec<_> = report
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .collect();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn common_routes_are_not_flagged() {
        let site = artifact(&[(
            "src/index.js",
            r#"<Route path="/" /><Route path="/mains" /><Route path="/about" /><Route path="/specials" />"#,
        )]);
        let report = validate(&site, &menu(), &test_support::design());
        assert_eq!(report.blocking_count(), 0);
        assert!(report
            .issues
            .iter()
            .any(|i| i.severity == Severity::Warning && i.message.contains("/specials")));
        assert!(!report.issues.iter().any(|i| i.message.contains("/about")));
    }

    #[tokio::test]
    async fn validator_stage_never_fails() {
        let stage = Validator;
        let report = stage
            .run(ValidatorInput {
                artifact: good_site(),
                menu: menu(),
                design: test_support::design(),
            })
            .await
            .unwrap();
        assert!(report.is_clean());
    }
}
