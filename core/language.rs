use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;

/// Code-fence language for a file, from its exact name first and then its
/// lowercased extension. Unknown files get an empty hint.
pub fn infer_language(path: &Path) -> &'static str {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    if let Some(language) = language_for_file_name(file_name) {
        return language;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| language_for_extension(&ext.to_lowercase()))
        .unwrap_or_default()
}

fn language_for_file_name(file_name: &str) -> Option<&'static str> {
    match file_name {
        "Dockerfile" | "Containerfile" => Some("docker"),
        "Makefile" | "GNUmakefile" => Some("makefile"),
        "CMakeLists.txt" => Some("cmake"),
        "Rakefile" | "Gemfile" => Some("ruby"),
        "Jenkinsfile" => Some("groovy"),
        _ if file_name.starts_with("Dockerfile.") => Some("docker"),
        _ => None,
    }
}

/// Lowercased extension to fence language.
static EXTENSION_LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let table: &[(&[&str], &str)] = &[
        (&["rs"], "rust"),
        (&["py", "pyi"], "python"),
        (&["js", "cjs", "mjs"], "javascript"),
        (&["jsx"], "jsx"),
        (&["ts"], "typescript"),
        (&["tsx"], "tsx"),
        (&["rb", "rake"], "ruby"),
        (&["go"], "go"),
        (&["c", "h"], "c"),
        (&["cpp", "cc", "cxx", "hpp", "hh"], "cpp"),
        (&["cs"], "csharp"),
        (&["java"], "java"),
        (&["kt", "kts"], "kotlin"),
        (&["swift"], "swift"),
        (&["php"], "php"),
        (&["scala"], "scala"),
        (&["sh", "bash", "zsh"], "bash"),
        (&["fish"], "fish"),
        (&["ps1"], "powershell"),
        (&["sql"], "sql"),
        (&["html", "htm"], "html"),
        (&["css"], "css"),
        (&["scss"], "scss"),
        (&["json"], "json"),
        (&["yaml", "yml"], "yaml"),
        (&["toml"], "toml"),
        (&["xml"], "xml"),
        (&["md", "markdown"], "markdown"),
        (&["org"], "org"),
        (&["ini", "cfg"], "ini"),
        (&["lua"], "lua"),
        (&["r"], "r"),
        (&["dart"], "dart"),
        (&["ex", "exs"], "elixir"),
        (&["hs"], "haskell"),
        (&["vue"], "vue"),
        (&["svelte"], "svelte"),
        (&["proto"], "protobuf"),
        (&["tf"], "hcl"),
        (&["dockerfile"], "docker"),
    ];
    table
        .iter()
        .flat_map(|(extensions, language)| extensions.iter().map(move |ext| (*ext, *language)))
        .collect()
});

fn language_for_extension(extension: &str) -> &'static str {
    EXTENSION_LANGUAGES.get(extension).copied().unwrap_or_default()
}
