// build.rs

//! Turns `locales/*.toml` into the `t!` macro.
//!
//! Every message is used as a `format!` string, so each translation must name
//! exactly the placeholders of its `en.toml` entry. All catalogues are checked
//! on every build, not only the one selected with `SMASH_LANG`.

use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::path::Path;

type Catalogue = BTreeMap<String, String>;

const LOCALES_DIR: &str = "locales";
const BASE_LANG: &str = "en";

fn main() {
    println!("cargo:rerun-if-env-changed=SMASH_LANG");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={LOCALES_DIR}");

    let base = read_catalogue(BASE_LANG);
    let mut problems = Vec::new();
    for lang in translation_langs() {
        check_against_base(&lang, &read_catalogue(&lang), &base, &mut problems);
    }
    if !problems.is_empty() {
        panic!("Invalid translations:\n  {}", problems.join("\n  "));
    }

    let lang = env::var("SMASH_LANG").unwrap_or_else(|_| BASE_LANG.to_string());
    println!("cargo:rustc-env=SMASH_LANG_EFFECTIVE={lang}");

    let mut messages = base;
    if lang != BASE_LANG {
        if Path::new(LOCALES_DIR).join(format!("{lang}.toml")).exists() {
            messages.extend(read_catalogue(&lang));
        } else {
            println!("cargo:warning=No catalogue for SMASH_LANG='{lang}', using '{BASE_LANG}'.");
        }
    }

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    fs::write(Path::new(&out_dir).join("translations.rs"), render_macro(&messages))
        .expect("Failed to write translations.rs");
}

fn read_catalogue(lang: &str) -> Catalogue {
    let path = Path::new(LOCALES_DIR).join(format!("{lang}.toml"));
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    toml::from_str(&content).unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()))
}

/// Languages with a catalogue besides the base one, sorted.
fn translation_langs() -> Vec<String> {
    let entries = fs::read_dir(LOCALES_DIR).expect("Failed to list locales/");
    let mut langs: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .filter_map(|path| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .filter(|lang| lang != BASE_LANG)
        .collect();
    langs.sort();
    langs
}

fn check_against_base(lang: &str, catalogue: &Catalogue, base: &Catalogue, problems: &mut Vec<String>) {
    for (key, message) in catalogue {
        let Some(base_message) = base.get(key) else {
            problems.push(format!("{lang}.toml: '{key}' is not in {BASE_LANG}.toml"));
            continue;
        };
        let expected = placeholders(base_message);
        let found = placeholders(message);
        if expected != found {
            problems.push(format!(
                "{lang}.toml: '{key}' uses {found:?}, {BASE_LANG}.toml uses {expected:?}"
            ));
        }
    }
}

/// Names inside `{name}` or `{name:spec}`. `{{` and `}}` are literal braces.
fn placeholders(message: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut chars = message.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '{' {
            continue;
        }
        if chars.peek() == Some(&'{') {
            chars.next();
            continue;
        }
        let inner: String = chars.by_ref().take_while(|&c| c != '}').collect();
        let name = inner.split(':').next().unwrap_or_default().trim();
        names.insert(name.to_string());
    }
    names
}

/// One arm per key expanding to a string literal, so `t!` works as a format
/// string. Unknown keys fail to compile.
fn render_macro(messages: &Catalogue) -> String {
    let mut code = String::from("#[macro_export]\nmacro_rules! t {\n");
    for (key, message) in messages {
        code.push_str(&format!("    ({key:?}) => {{ {message:?} }};\n"));
    }
    code.push_str(
        "    ($key:expr) => {{ compile_error!(concat!(\"Missing translation key: \", $key)) }};\n",
    );
    code.push_str("}\n");
    code
}
