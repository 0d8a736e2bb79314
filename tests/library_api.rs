//! Integration tests for the layerguard library API.

use layerguard::ast::{
    ClassLikeType, DependencyType, FileParser, FileReference, FileReferenceBuilder, ParseError,
    ParserRegistry, Token,
};
use layerguard::layer::collector::CollectorError;
use layerguard::{AnalysisOptions, Config, LayerguardError, analyse};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// One statement per line: `use X`, `class X`, `interface X`, `extends X`,
/// `implements X`, `new X`. A line holding `!` is a syntax error.
struct StatementParser;

impl FileParser for StatementParser {
    fn extensions(&self) -> &[&str] {
        &["php"]
    }

    fn parse(&self, path: &Path) -> Result<FileReference, ParseError> {
        let source = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut builder = FileReferenceBuilder::new(path);
        for (idx, line) in source.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line == "!" {
                return Err(ParseError::Syntax {
                    path: path.to_path_buf(),
                    message: format!("unexpected '!' on line {line_no}"),
                });
            }
            let Some((keyword, name)) = line.split_once(' ') else {
                continue;
            };
            builder = match keyword {
                "use" => builder.use_statement(name, line_no),
                "class" => builder.class_like(name, ClassLikeType::Class, line_no),
                "interface" => builder.class_like(name, ClassLikeType::Interface, line_no),
                "extends" => builder.extends(name, line_no),
                "implements" => builder.implements(name, line_no),
                "new" => builder.dependency(Token::class_like(name), line_no, DependencyType::New),
                _ => builder,
            };
        }
        Ok(builder.build())
    }
}

const CONFIG: &str = r#"
paths = ["src"]

[[layers]]
name = "Controller"
collectors = [{ type = "glob", value = "src/Controller/**" }]

[[layers]]
name = "Service"
collectors = [{ type = "classLike", value = "^App\\\\Service\\\\" }]

[[layers]]
name = "Repository"
collectors = [{ type = "directory", value = "src/Repository/" }]
"#;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(root, ".layerguard.toml", CONFIG);
    write(
        root,
        "src/Controller/UserController.php",
        "use App\\Service\\UserService\n\
         class App\\Controller\\UserController\n\
         extends App\\Controller\\BaseController\n\
         new App\\Repository\\UserRepository\n",
    );
    write(
        root,
        "src/Controller/BaseController.php",
        "class App\\Controller\\BaseController\n",
    );
    write(
        root,
        "src/Service/UserService.php",
        "class App\\Service\\UserService\n",
    );
    write(
        root,
        "src/Repository/UserRepository.php",
        "class App\\Repository\\UserRepository\n",
    );
    write(root, "src/notes.txt", "not source");
    dir
}

fn parsers() -> ParserRegistry {
    ParserRegistry::new().with_parser(StatementParser)
}

fn class(name: &str) -> Token {
    Token::class_like(name)
}

#[test]
fn test_analyse_resolves_dependencies_and_layers() {
    let dir = project();
    let result = analyse(dir.path(), &parsers(), AnalysisOptions::default()).unwrap();

    assert_eq!(result.ast_map.len(), 4);

    let deps = &result.dependencies;
    let controller = class("App\\Controller\\UserController");
    let base = class("App\\Controller\\BaseController");
    let service = class("App\\Service\\UserService");
    let repository = class("App\\Repository\\UserRepository");

    assert!(deps.contains(&controller, &repository));
    assert!(deps.contains(&controller, &base));
    assert!(deps.contains(&controller, &service));

    // Raised to the parent by flattening.
    assert!(deps.contains(&base, &service));
    assert!(deps.contains(&base, &repository));
    assert_eq!(deps.inherited().count(), 2);

    let layers = &result.layers;
    let layers_of = |token: &Token| {
        layers
            .layers_for_token(token, &result.ast_map)
            .unwrap()
            .into_iter()
            .collect::<Vec<_>>()
    };
    assert_eq!(layers_of(&controller), vec!["Controller"]);
    assert_eq!(layers_of(&service), vec!["Service"]);
    assert_eq!(layers_of(&repository), vec!["Repository"]);
    assert!(layers_of(&class("Vendor\\Logger")).is_empty());
}

#[test]
fn test_second_run_is_served_from_cache() {
    let dir = project();

    let first = analyse(dir.path(), &parsers(), AnalysisOptions::default()).unwrap();
    assert_eq!(first.stats.parsed, 4);
    assert!(dir.path().join(".layerguard.cache").exists());

    let second = analyse(dir.path(), &parsers(), AnalysisOptions::default()).unwrap();
    assert_eq!(second.stats.cached, 4);
    assert_eq!(second.stats.parsed, 0);
    assert_eq!(second.dependencies.len(), first.dependencies.len());

    write(
        dir.path(),
        "src/Service/UserService.php",
        "class App\\Service\\UserService\nnew App\\Repository\\UserRepository\n",
    );
    let third = analyse(dir.path(), &parsers(), AnalysisOptions::default()).unwrap();
    assert_eq!(third.stats.cached, 3);
    assert_eq!(third.stats.parsed, 1);
    assert!(third.dependencies.contains(
        &class("App\\Service\\UserService"),
        &class("App\\Repository\\UserRepository")
    ));
}

#[test]
fn test_cache_is_not_written_when_disabled() {
    let dir = project();
    let options = AnalysisOptions {
        persist_cache: false,
        ..AnalysisOptions::default()
    };

    analyse(dir.path(), &parsers(), options).unwrap();
    assert!(!dir.path().join(".layerguard.cache").exists());
}

#[test]
fn test_syntax_errors_skip_the_file() {
    let dir = project();
    write(dir.path(), "src/Service/Broken.php", "class App\\Service\\Broken\n!\n");

    let result = analyse(dir.path(), &parsers(), AnalysisOptions::default()).unwrap();

    assert_eq!(result.ast_map.len(), 4);
    assert_eq!(result.stats.skipped, 1);
}

#[test]
fn test_config_override() {
    let dir = project();
    let config =
        Config::parse("paths = [\"src/Service\"]\n[analyser]\ntypes = [\"class\"]").unwrap();
    let options = AnalysisOptions {
        config: Some(config),
        ..AnalysisOptions::default()
    };

    let result = analyse(dir.path(), &parsers(), options).unwrap();

    assert_eq!(result.ast_map.len(), 1);
    assert!(result.layers.layers().is_empty());
}

#[test]
fn test_unknown_collector_type() {
    let dir = project();
    write(
        dir.path(),
        ".layerguard.toml",
        "[[layers]]\nname = \"Domain\"\ncollectors = [{ type = \"namespace\", value = \"App\" }]\n",
    );

    let err = analyse(dir.path(), &parsers(), AnalysisOptions::default())
        .err()
        .unwrap();
    match err {
        LayerguardError::Collector(CollectorError::UnsupportedType { kind, known }) => {
            assert_eq!(kind, "namespace");
            assert!(known.iter().any(|k| k == "glob"));
        }
        other => panic!("Expected UnsupportedType, got: {other:?}"),
    }
}

#[test]
fn test_invalid_path() {
    let result = analyse(
        Path::new("/nonexistent/layerguard/project"),
        &parsers(),
        AnalysisOptions::default(),
    );

    match result {
        Err(LayerguardError::PathNotFound(_)) => {}
        Err(e) => panic!("Expected PathNotFound error, got: {e:?}"),
        Ok(_) => panic!("Expected error for invalid path"),
    }
}
