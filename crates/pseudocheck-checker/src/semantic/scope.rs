use std::collections::{HashMap, HashSet};

/// How a name entered the symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Constant,
    Parameter,
    EnumMember,
}

/// Recorded type of every constant.
pub const CONSTANT_TYPE: &str = "CONSTANT";

/// A declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Spelling at the declaration site.
    pub name: String,
    pub kind: SymbolKind,
    pub declared_type: String,
    pub line: u32,
}

impl Symbol {
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        declared_type: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            declared_type: declared_type.into(),
            line,
        }
    }

    /// Case-insensitive, whitespace-insensitive type comparison.
    pub fn has_type(&self, ty: &str) -> bool {
        normalize_type(&self.declared_type) == normalize_type(ty)
    }
}

/// Uppercase a type and collapse its internal whitespace.
pub fn normalize_type(ty: &str) -> String {
    ty.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

/// Names visible to the rest of the scan, keyed case-insensitively.
///
/// There is a single flat scope: the dialect has no block scoping and
/// parameters stay visible once their subroutine header has been seen.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a symbol unless the name is taken.
    /// Returns `Err` with the existing definition on duplicate.
    pub fn define(&mut self, symbol: Symbol) -> Result<(), Symbol> {
        let key = symbol.name.to_ascii_lowercase();
        if let Some(existing) = self.symbols.get(&key) {
            return Err(existing.clone());
        }
        self.symbols.insert(key, symbol);
        Ok(())
    }

    /// Define a symbol, replacing any previous definition.
    pub fn redefine(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.name.to_ascii_lowercase(), symbol);
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(&name.to_ascii_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

/// Inclusive index range of a one-dimensional array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayBounds {
    pub lower: i64,
    pub upper: i64,
    pub line: u32,
}

impl ArrayBounds {
    pub fn contains(&self, index: i64) -> bool {
        self.lower <= index && index <= self.upper
    }
}

/// Arrays whose bounds could be read from their declaration.
#[derive(Debug, Default)]
pub struct ArrayTable {
    arrays: HashMap<String, ArrayBounds>,
}

impl ArrayTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, bounds: ArrayBounds) {
        self.arrays.insert(name.to_ascii_lowercase(), bounds);
    }

    pub fn lookup(&self, name: &str) -> Option<&ArrayBounds> {
        self.arrays.get(&name.to_ascii_lowercase())
    }
}

/// Names declared with FUNCTION.
#[derive(Debug, Default)]
pub struct FunctionSet {
    names: HashSet<String>,
}

impl FunctionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str) {
        self.names.insert(name.to_ascii_lowercase());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str, ty: &str) -> Symbol {
        Symbol::new(name, SymbolKind::Variable, ty, 1)
    }

    #[test]
    fn define_and_lookup_ignore_case() {
        let mut table = SymbolTable::new();
        table.define(variable("Total", "INTEGER")).unwrap();
        assert!(table.contains("total"));
        assert!(table.contains("TOTAL"));
        assert_eq!(table.lookup("total").unwrap().name, "Total");
        assert!(!table.contains("count"));
    }

    #[test]
    fn duplicate_definition_returns_existing() {
        let mut table = SymbolTable::new();
        table.define(variable("x", "INTEGER")).unwrap();
        let existing = table.define(variable("X", "STRING")).unwrap_err();
        assert_eq!(existing.declared_type, "INTEGER");
        assert_eq!(table.lookup("x").unwrap().declared_type, "INTEGER");
    }

    #[test]
    fn redefine_replaces() {
        let mut table = SymbolTable::new();
        table.define(variable("n", "INTEGER")).unwrap();
        table.redefine(Symbol::new("n", SymbolKind::Parameter, "REAL", 4));
        let sym = table.lookup("n").unwrap();
        assert_eq!(sym.kind, SymbolKind::Parameter);
        assert_eq!(sym.line, 4);
    }

    #[test]
    fn type_comparison_is_normalized() {
        let sym = variable("a", "ARRAY[1:5]  OF integer");
        assert!(sym.has_type("array[1:5] OF INTEGER"));
        assert!(!sym.has_type("ARRAY[1:6] OF INTEGER"));
    }

    #[test]
    fn array_bounds_are_inclusive() {
        let mut arrays = ArrayTable::new();
        arrays.insert(
            "Scores",
            ArrayBounds {
                lower: 1,
                upper: 5,
                line: 2,
            },
        );
        let bounds = arrays.lookup("scores").unwrap();
        assert!(bounds.contains(1));
        assert!(bounds.contains(5));
        assert!(!bounds.contains(0));
        assert!(!bounds.contains(6));
    }

    #[test]
    fn function_set_ignores_case() {
        let mut functions = FunctionSet::new();
        functions.insert("Square");
        assert!(functions.contains("SQUARE"));
        assert!(!functions.contains("cube"));
    }
}
