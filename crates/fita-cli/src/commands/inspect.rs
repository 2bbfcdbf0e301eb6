//! Document inspection commands.

use std::path::Path;

use anyhow::{Context, Result};

use crate::session::{load_automaton, load_tree};

/// Validate an automaton document and, optionally, a tree against it.
pub fn validate(automaton_path: &Path, tree_path: Option<&Path>) -> Result<()> {
    let automaton = load_automaton(automaton_path)?
        .into_automaton()
        .with_context(|| format!("Invalid automaton in {}", automaton_path.display()))?;

    println!("✅ {}", automaton.type_name());
    if let Some(name) = automaton.name() {
        println!("   Name:        {name}");
    }
    println!("   Kind:        {}", automaton.kind().abbreviation());
    println!("   Alphabet:    {}", automaton.alphabet().len());
    println!("   Variables:   {}", automaton.variables().len());
    println!(
        "   Transitions: {} ({})",
        automaton.transitions().len(),
        automaton.direction()
    );
    println!(
        "   Accepting:   {} finite, {} Büchi",
        automaton.accepting_conditions().len(),
        automaton.buchi_accepting_conditions().len()
    );

    if let Some(tree_path) = tree_path {
        let tree = load_tree(tree_path)?;
        if tree.contains_back_reference() && !automaton.is_infinite() {
            anyhow::bail!(
                "{} is infinite but the automaton only runs on finite trees",
                tree_path.display()
            );
        }
        if let Some(label) = tree.labels().find(|l| !automaton.is_in_alphabet(l)) {
            anyhow::bail!(
                "{} uses label '{label}' outside the alphabet",
                tree_path.display()
            );
        }
        println!(
            "✅ Tree with {} vertices{}",
            tree.len(),
            if tree.contains_back_reference() {
                " (infinite)"
            } else {
                ""
            }
        );
    }

    Ok(())
}

/// Print a tree document in normalized form.
pub fn show(tree_path: &Path) -> Result<()> {
    let tree = load_tree(tree_path)?;
    println!("{}", tree.to_document().to_json()?);
    Ok(())
}
