use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

pub const OTHER_LANGUAGE: &str = "Other";

pub const MAIN_LANGUAGES: [&str; 13] = [
    "Go",
    "TypeScript",
    "JavaScript",
    "Python",
    "Rust",
    "Java",
    "C++",
    "C#",
    "Ruby",
    "PHP",
    "Swift",
    "Kotlin",
    "Dart",
];

// Keys are lower-case extensions without the leading dot.
static EXTENSIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("go", "Go"),
        ("js", "JavaScript"),
        ("jsx", "JavaScript"),
        ("ts", "TypeScript"),
        ("tsx", "TypeScript"),
        ("py", "Python"),
        ("java", "Java"),
        ("rb", "Ruby"),
        ("php", "PHP"),
        ("c", "C"),
        ("cpp", "C++"),
        ("cc", "C++"),
        ("cxx", "C++"),
        ("cs", "C#"),
        ("rs", "Rust"),
        ("swift", "Swift"),
        ("kt", "Kotlin"),
        ("kts", "Kotlin"),
        ("scala", "Scala"),
        ("dart", "Dart"),
        ("html", "HTML"),
        ("htm", "HTML"),
        ("css", "CSS"),
        ("scss", "SCSS"),
        ("sass", "Sass"),
        ("less", "Less"),
        ("vue", "Vue"),
        ("svelte", "Svelte"),
        ("sql", "SQL"),
        ("sh", "Shell"),
        ("bash", "Shell"),
        ("zsh", "Shell"),
        ("json", "JSON"),
        ("yaml", "YAML"),
        ("yml", "YAML"),
        ("xml", "XML"),
        ("md", "Markdown"),
        ("txt", "Text"),
        ("toml", "TOML"),
        ("ini", "INI"),
        ("conf", "Config"),
        ("env", "Environment"),
        ("lock", "Lock File"),
        ("sum", "Checksum"),
        ("mod", "Module"),
        ("config", "Config"),
        ("eslintrc", "ESLint"),
        ("prettierrc", "Prettier"),
        ("editorconfig", "EditorConfig"),
        ("gitignore", "Git"),
        ("log", "Log"),
        ("dockerfile", "Docker"),
        ("makefile", "Makefile"),
    ])
});

// Exact, case-sensitive base names. Checked before the extension table so
// that e.g. `go.sum` is Go rather than the generic `.sum` bucket.
static SPECIAL_FILES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Dockerfile", "Docker"),
        ("Makefile", "Makefile"),
        ("Gemfile", "Ruby"),
        ("Rakefile", "Ruby"),
        ("package.json", "JavaScript"),
        ("package-lock.json", "JavaScript"),
        ("pnpm-lock.yaml", "JavaScript"),
        ("yarn.lock", "JavaScript"),
        ("go.mod", "Go"),
        ("go.sum", "Go"),
        ("requirements.txt", "Python"),
        ("Pipfile", "Python"),
        ("Cargo.toml", "Rust"),
        ("Cargo.lock", "Rust"),
        ("pom.xml", "Java"),
        ("build.gradle", "Java"),
        (".gitignore", "Git"),
        (".dockerignore", "Docker"),
        ("tsconfig.json", "TypeScript"),
        ("tsconfig.app.json", "TypeScript"),
        ("tsconfig.node.json", "TypeScript"),
        ("vite.config.ts", "TypeScript"),
        ("vite.config.js", "JavaScript"),
        (".eslintrc.js", "JavaScript"),
        (".prettierrc.js", "JavaScript"),
        ("jest.config.js", "JavaScript"),
        ("tailwind.config.js", "JavaScript"),
        ("postcss.config.js", "JavaScript"),
        ("vercel.json", "Config"),
        ("netlify.toml", "Config"),
    ])
});

static MAIN_LANGUAGE_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| MAIN_LANGUAGES.iter().copied().collect());

/// Maps a changed file path to a language label. Never fails; unknown files
/// are reported as [`OTHER_LANGUAGE`].
pub fn classify(path: &str) -> &'static str {
    let base = file_name(path);
    if let Some(lang) = SPECIAL_FILES.get(base) {
        return *lang;
    }
    extension(base)
        .and_then(|ext| EXTENSIONS.get(ext.to_ascii_lowercase().as_str()))
        .copied()
        .unwrap_or(OTHER_LANGUAGE)
}

pub fn is_main_language(language: &str) -> bool {
    MAIN_LANGUAGE_SET.contains(language)
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn extension(base: &str) -> Option<&str> {
    let (_, ext) = base.rsplit_once('.')?;
    (!ext.is_empty()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(classify("main.go"), "Go");
        assert_eq!(classify("web/src/app.tsx"), "TypeScript");
        assert_eq!(classify("lib/core.RS"), "Rust");
        assert_eq!(classify("docs/guide.md"), "Markdown");
    }

    #[test]
    fn special_names_need_no_extension() {
        assert_eq!(classify("Dockerfile"), "Docker");
        assert_eq!(classify("build/Makefile"), "Makefile");
        assert_eq!(classify("Gemfile"), "Ruby");
    }

    #[test]
    fn special_names_take_precedence_over_extension() {
        assert_eq!(classify("go.sum"), "Go");
        assert_eq!(classify("go.mod"), "Go");
        assert_eq!(classify("Cargo.lock"), "Rust");
        assert_eq!(classify("frontend/package.json"), "JavaScript");
        assert_eq!(classify("other.sum"), "Checksum");
        assert_eq!(classify("poetry.lock"), "Lock File");
    }

    #[test]
    fn dot_files_use_their_name_as_extension() {
        assert_eq!(classify(".env"), "Environment");
        assert_eq!(classify(".editorconfig"), "EditorConfig");
        assert_eq!(classify("sub/.gitignore"), "Git");
    }

    #[test]
    fn unknown_files_fall_back_to_other() {
        assert_eq!(classify("data.xyz"), OTHER_LANGUAGE);
        assert_eq!(classify("README"), OTHER_LANGUAGE);
        assert_eq!(classify("trailing."), OTHER_LANGUAGE);
        assert_eq!(classify(""), OTHER_LANGUAGE);
    }

    #[test]
    fn main_language_allow_list() {
        assert!(is_main_language("Go"));
        assert!(is_main_language("C#"));
        assert!(!is_main_language("Checksum"));
        assert!(!is_main_language("Markdown"));
    }
}
