use std::collections::HashMap;

/// A symbol's storage class. Each kind maps to exactly one VM segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Static,
    Field,
    Argument,
    Local,
}

impl SymbolKind {
    /// The VM segment a value of this kind is pushed/popped through.
    pub fn segment(self) -> &'static str {
        match self {
            SymbolKind::Static => "static",
            SymbolKind::Field => "this",
            SymbolKind::Argument => "argument",
            SymbolKind::Local => "local",
        }
    }
}

/// A declared name: its type, storage kind, and dense 0-based index
/// within that kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub type_name: String,
    pub kind: SymbolKind,
    pub index: u16,
}

/// Two flat scopes — class and subroutine — plus one counter per kind.
///
/// Lookup always tries the subroutine scope first, then the class scope,
/// so a subroutine-local declaration shadows a same-named field or static.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Symbol>,
    subroutine_scope: HashMap<String, Symbol>,
    statics: u16,
    fields: u16,
    arguments: u16,
    locals: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the subroutine scope and resets the `Argument`/`Local`
    /// counters. Class scope and its counters are untouched.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.arguments = 0;
        self.locals = 0;
    }

    /// Inserts `name` into the scope implied by `kind` and post-increments
    /// that kind's counter.
    pub fn define(&mut self, name: &str, type_name: &str, kind: SymbolKind) {
        let index = self.count_mut(kind);
        let assigned = *index;
        *index += 1;
        let symbol = Symbol {
            type_name: type_name.to_string(),
            kind,
            index: assigned,
        };
        match kind {
            SymbolKind::Static | SymbolKind::Field => {
                self.class_scope.insert(name.to_string(), symbol);
            }
            SymbolKind::Argument | SymbolKind::Local => {
                self.subroutine_scope.insert(name.to_string(), symbol);
            }
        }
    }

    fn count_mut(&mut self, kind: SymbolKind) -> &mut u16 {
        match kind {
            SymbolKind::Static => &mut self.statics,
            SymbolKind::Field => &mut self.fields,
            SymbolKind::Argument => &mut self.arguments,
            SymbolKind::Local => &mut self.locals,
        }
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.lookup(name).map(|s| s.kind)
    }

    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|s| s.type_name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.lookup(name).map(|s| s.index)
    }

    /// The current count for `kind` — sizes constructor allocations
    /// (`Field`) and function-local frames (`Local`).
    pub fn var_count(&self, kind: SymbolKind) -> u16 {
        match kind {
            SymbolKind::Static => self.statics,
            SymbolKind::Field => self.fields,
            SymbolKind::Argument => self.arguments,
            SymbolKind::Local => self.locals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_indices_are_contiguous() {
        let mut table = SymbolTable::new();
        table.define("x", "int", SymbolKind::Field);
        table.define("y", "int", SymbolKind::Field);
        assert_eq!(table.index_of("x"), Some(0));
        assert_eq!(table.index_of("y"), Some(1));
        assert_eq!(table.var_count(SymbolKind::Field), 2);
    }

    #[test]
    fn subroutine_scope_resets_but_class_scope_survives() {
        let mut table = SymbolTable::new();
        table.define("count", "int", SymbolKind::Field);
        table.start_subroutine();
        table.define("this", "Foo", SymbolKind::Argument);
        table.define("i", "int", SymbolKind::Local);
        assert_eq!(table.kind_of("count"), Some(SymbolKind::Field));
        assert_eq!(table.kind_of("this"), Some(SymbolKind::Argument));

        table.start_subroutine();
        assert_eq!(table.kind_of("this"), None);
        assert_eq!(table.kind_of("i"), None);
        assert_eq!(table.kind_of("count"), Some(SymbolKind::Field));
        assert_eq!(table.var_count(SymbolKind::Argument), 0);
    }

    #[test]
    fn subroutine_scope_shadows_class_scope() {
        let mut table = SymbolTable::new();
        table.define("x", "int", SymbolKind::Field);
        table.start_subroutine();
        table.define("x", "char", SymbolKind::Local);
        assert_eq!(table.kind_of("x"), Some(SymbolKind::Local));
        assert_eq!(table.type_of("x"), Some("char"));
    }

    #[test]
    fn unresolved_name_is_absent() {
        let table = SymbolTable::new();
        assert_eq!(table.kind_of("nope"), None);
        assert_eq!(table.type_of("nope"), None);
        assert_eq!(table.index_of("nope"), None);
    }
}
