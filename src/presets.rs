//! Text-level expansion of named rule presets.

/// Expands a `b3s23` line (appearing alone, after trimming) into its
/// three-line HexiDirect equivalent. Leaves every other line untouched.
pub fn expand_presets(source: &str) -> String {
    let mut out = Vec::new();
    for line in source.split('\n') {
        if line.trim() == "b3s23" {
            out.push(B3S23_EXPANSION.to_string());
        } else {
            out.push(line.to_string());
        }
    }
    out.join("\n")
}

const B3S23_EXPANSION: &str = "_[a]3[_]3 => a\na[a]2[_|a][_]3 => a\na[_|a][_]5 | a[a]4[_|a][_|a] => _";
