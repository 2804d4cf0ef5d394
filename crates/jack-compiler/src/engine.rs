//! Recursive-descent parser whose non-terminals double as code-generation
//! routines. There is no intermediate AST: each grammar production both
//! consumes tokens and emits VM instructions in the same pass.

use jack_core::{JackError, SymbolKind, SymbolTable, TokenKind};

use crate::lexer::Tokenizer;
use crate::vm_writer::VmWriter;

pub struct CompilationEngine {
    tokens: Tokenizer,
    writer: VmWriter,
    symbols: SymbolTable,
    class_name: String,
    label_count: u32,
}

impl CompilationEngine {
    pub fn new(source: &str) -> Result<Self, JackError> {
        Ok(CompilationEngine {
            tokens: Tokenizer::new(source)?,
            writer: VmWriter::new(),
            symbols: SymbolTable::new(),
            class_name: String::new(),
            label_count: 0,
        })
    }

    /// Compiles the one class declaration a compilation unit holds and
    /// returns the accumulated VM text.
    pub fn compile(mut self) -> Result<String, JackError> {
        self.compile_class()?;
        Ok(self.writer.into_output())
    }

    fn new_label(&mut self, prefix: &str) -> String {
        self.label_count += 1;
        format!("{prefix}_{}", self.label_count)
    }

    /// Resolves `name` to its storage segment and index. An undeclared
    /// name resolves permissively to an empty segment and index 0,
    /// matching the source material's behavior (see the "Unresolved
    /// identifiers" design note) rather than raising a semantic error.
    fn resolve(&self, name: &str) -> (String, u16) {
        match (self.symbols.kind_of(name), self.symbols.index_of(name)) {
            (Some(kind), Some(index)) => (kind.segment().to_string(), index),
            _ => (String::new(), 0),
        }
    }

    fn peek_lexeme(&self) -> Option<&str> {
        self.tokens.peek().map(|t| t.lexeme.as_str())
    }

    fn compile_class(&mut self) -> Result<(), JackError> {
        self.tokens.expect_value("class")?;
        self.class_name = self.tokens.expect_identifier()?.lexeme;
        self.tokens.expect_value("{")?;

        while matches!(self.peek_lexeme(), Some("static") | Some("field")) {
            self.compile_class_var_dec()?;
        }
        while matches!(
            self.peek_lexeme(),
            Some("constructor") | Some("function") | Some("method")
        ) {
            self.compile_subroutine()?;
        }

        self.tokens.expect_value("}")?;
        Ok(())
    }

    fn compile_type(&mut self) -> Result<String, JackError> {
        self.tokens
            .advance()
            .map(|t| t.lexeme)
            .ok_or(JackError::UnexpectedEof {
                expected: "type".to_string(),
            })
    }

    fn compile_class_var_dec(&mut self) -> Result<(), JackError> {
        let kind_lexeme = self.tokens.advance().expect("peeked").lexeme;
        let kind = if kind_lexeme == "static" {
            SymbolKind::Static
        } else {
            SymbolKind::Field
        };
        let type_name = self.compile_type()?;

        loop {
            let name = self.tokens.expect_identifier()?.lexeme;
            self.symbols.define(&name, &type_name, kind);
            if self.peek_lexeme() == Some(",") {
                self.tokens.advance();
            } else {
                break;
            }
        }
        self.tokens.expect_value(";")?;
        Ok(())
    }

    /// Parses one `var <type> <id> (',' <id>)* ';'` declaration, defining
    /// each name as a `Local`. Returns the count of names declared.
    fn compile_var_dec(&mut self) -> Result<usize, JackError> {
        self.tokens.expect_value("var")?;
        let type_name = self.compile_type()?;
        let mut count = 0;
        loop {
            let name = self.tokens.expect_identifier()?.lexeme;
            self.symbols.define(&name, &type_name, SymbolKind::Local);
            count += 1;
            if self.peek_lexeme() == Some(",") {
                self.tokens.advance();
            } else {
                break;
            }
        }
        self.tokens.expect_value(";")?;
        Ok(count)
    }

    fn compile_subroutine(&mut self) -> Result<(), JackError> {
        let sub_kind = self.tokens.advance().expect("peeked").lexeme;
        self.tokens.advance(); // return type, unused
        let name = self.tokens.expect_identifier()?.lexeme;

        self.symbols.start_subroutine();
        if sub_kind == "method" {
            self.symbols
                .define("this", &self.class_name.clone(), SymbolKind::Argument);
        }

        self.tokens.expect_value("(")?;
        self.compile_parameter_list()?;
        self.tokens.expect_value(")")?;

        self.tokens.expect_value("{")?;
        let mut n_locals = 0usize;
        while self.peek_lexeme() == Some("var") {
            n_locals += self.compile_var_dec()?;
        }

        self.writer
            .write_function(&format!("{}.{}", self.class_name, name), n_locals as u16);

        match sub_kind.as_str() {
            "constructor" => {
                let field_count = self.symbols.var_count(SymbolKind::Field);
                self.writer.write_push("constant", field_count);
                self.writer.write_call("Memory.alloc", 1);
                self.writer.write_pop("pointer", 0);
            }
            "method" => {
                self.writer.write_push("argument", 0);
                self.writer.write_pop("pointer", 0);
            }
            _ => {}
        }

        self.compile_statements()?;
        self.tokens.expect_value("}")?;
        Ok(())
    }

    fn compile_parameter_list(&mut self) -> Result<(), JackError> {
        if self.peek_lexeme() == Some(")") {
            return Ok(());
        }
        loop {
            let type_name = self.compile_type()?;
            let name = self.tokens.expect_identifier()?.lexeme;
            self.symbols.define(&name, &type_name, SymbolKind::Argument);
            if self.peek_lexeme() == Some(",") {
                self.tokens.advance();
            } else {
                break;
            }
        }
        Ok(())
    }

    fn compile_statements(&mut self) -> Result<(), JackError> {
        loop {
            match self.peek_lexeme() {
                Some("let") => self.compile_let()?,
                Some("if") => self.compile_if()?,
                Some("while") => self.compile_while()?,
                Some("do") => self.compile_do()?,
                Some("return") => self.compile_return()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn compile_let(&mut self) -> Result<(), JackError> {
        self.tokens.expect_value("let")?;
        let name = self.tokens.expect_identifier()?.lexeme;
        let mut is_array = false;

        if self.peek_lexeme() == Some("[") {
            is_array = true;
            self.tokens.advance();
            self.compile_expression()?;
            self.tokens.expect_value("]")?;
            let (seg, idx) = self.resolve(&name);
            self.writer.write_push(&seg, idx);
            self.writer.write_arithmetic("add");
        }

        self.tokens.expect_value("=")?;
        self.compile_expression()?;
        self.tokens.expect_value(";")?;

        if is_array {
            self.writer.write_pop("temp", 0);
            self.writer.write_pop("pointer", 1);
            self.writer.write_push("temp", 0);
            self.writer.write_pop("that", 0);
        } else {
            let (seg, idx) = self.resolve(&name);
            self.writer.write_pop(&seg, idx);
        }
        Ok(())
    }

    fn compile_do(&mut self) -> Result<(), JackError> {
        self.tokens.expect_value("do")?;
        self.compile_term()?;
        self.writer.write_pop("temp", 0);
        self.tokens.expect_value(";")?;
        Ok(())
    }

    fn compile_return(&mut self) -> Result<(), JackError> {
        self.tokens.expect_value("return")?;
        if self.peek_lexeme() != Some(";") {
            self.compile_expression()?;
        } else {
            self.writer.write_push("constant", 0);
        }
        self.writer.write_return();
        self.tokens.expect_value(";")?;
        Ok(())
    }

    fn compile_if(&mut self) -> Result<(), JackError> {
        let l_false = self.new_label("IF_FALSE");
        let l_end = self.new_label("IF_END");

        self.tokens.expect_value("if")?;
        self.tokens.expect_value("(")?;
        self.compile_expression()?;
        self.tokens.expect_value(")")?;
        self.writer.write_arithmetic("not");
        self.writer.write_if(&l_false);

        self.tokens.expect_value("{")?;
        self.compile_statements()?;
        self.tokens.expect_value("}")?;
        self.writer.write_goto(&l_end);
        self.writer.write_label(&l_false);

        if self.peek_lexeme() == Some("else") {
            self.tokens.advance();
            self.tokens.expect_value("{")?;
            self.compile_statements()?;
            self.tokens.expect_value("}")?;
        }
        self.writer.write_label(&l_end);
        Ok(())
    }

    fn compile_while(&mut self) -> Result<(), JackError> {
        let l_exp = self.new_label("WHILE_EXP");
        let l_end = self.new_label("WHILE_END");

        self.writer.write_label(&l_exp);
        self.tokens.expect_value("while")?;
        self.tokens.expect_value("(")?;
        self.compile_expression()?;
        self.tokens.expect_value(")")?;
        self.writer.write_arithmetic("not");
        self.writer.write_if(&l_end);

        self.tokens.expect_value("{")?;
        self.compile_statements()?;
        self.tokens.expect_value("}")?;
        self.writer.write_goto(&l_exp);
        self.writer.write_label(&l_end);
        Ok(())
    }

    fn compile_expression(&mut self) -> Result<(), JackError> {
        self.compile_term()?;
        while let Some(op) = self.peek_lexeme().filter(|l| is_binary_op(l)) {
            let op = op.to_string();
            self.tokens.advance();
            self.compile_term()?;
            match op.as_str() {
                "+" => self.writer.write_arithmetic("add"),
                "-" => self.writer.write_arithmetic("sub"),
                "&" => self.writer.write_arithmetic("and"),
                "|" => self.writer.write_arithmetic("or"),
                "<" => self.writer.write_arithmetic("lt"),
                ">" => self.writer.write_arithmetic("gt"),
                "=" => self.writer.write_arithmetic("eq"),
                "*" => self.writer.write_call("Math.multiply", 2),
                "/" => self.writer.write_call("Math.divide", 2),
                _ => unreachable!(),
            }
        }
        Ok(())
    }

    fn compile_term(&mut self) -> Result<(), JackError> {
        let token = self.tokens.advance().ok_or(JackError::UnexpectedEof {
            expected: "term".to_string(),
        })?;

        match token.kind {
            TokenKind::IntegerLiteral => {
                self.writer.write_push("constant", token.int_value());
            }
            TokenKind::StringLiteral => {
                let value = token.string_value().to_string();
                self.writer.write_push("constant", value.chars().count() as u16);
                self.writer.write_call("String.new", 1);
                for c in value.chars() {
                    self.writer.write_push("constant", c as u16);
                    self.writer.write_call("String.appendChar", 2);
                }
            }
            TokenKind::Keyword => match token.lexeme.as_str() {
                "this" => self.writer.write_push("pointer", 0),
                "null" | "false" => self.writer.write_push("constant", 0),
                "true" => {
                    self.writer.write_push("constant", 0);
                    self.writer.write_arithmetic("not");
                }
                _ => {}
            },
            TokenKind::Symbol if token.lexeme == "(" => {
                self.compile_expression()?;
                self.tokens.expect_value(")")?;
            }
            TokenKind::Symbol if token.lexeme == "-" => {
                self.compile_term()?;
                self.writer.write_arithmetic("neg");
            }
            TokenKind::Symbol if token.lexeme == "~" => {
                self.compile_term()?;
                self.writer.write_arithmetic("not");
            }
            TokenKind::Identifier => {
                let name = token.lexeme;
                match self.peek_lexeme() {
                    Some("[") => {
                        self.tokens.advance();
                        self.compile_expression()?;
                        self.tokens.expect_value("]")?;
                        let (seg, idx) = self.resolve(&name);
                        self.writer.write_push(&seg, idx);
                        self.writer.write_arithmetic("add");
                        self.writer.write_pop("pointer", 1);
                        self.writer.write_push("that", 0);
                    }
                    Some("(") | Some(".") => self.compile_call(&name)?,
                    _ => {
                        let (seg, idx) = self.resolve(&name);
                        self.writer.write_push(&seg, idx);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Resolves `id(...)` / `id.sub(...)` to one of the three call shapes
    /// documented in the compilation engine's call-resolution rules.
    fn compile_call(&mut self, first_id: &str) -> Result<(), JackError> {
        let full_name;
        let mut n_args: u16 = 0;

        if self.peek_lexeme() == Some(".") {
            self.tokens.advance();
            let sub_name = self.tokens.expect_identifier()?.lexeme;
            if let Some(declared_type) = self.symbols.type_of(first_id) {
                let declared_type = declared_type.to_string();
                let (seg, idx) = self.resolve(first_id);
                self.writer.write_push(&seg, idx);
                full_name = format!("{declared_type}.{sub_name}");
                n_args = 1;
            } else {
                full_name = format!("{first_id}.{sub_name}");
            }
        } else {
            self.writer.write_push("pointer", 0);
            full_name = format!("{}.{}", self.class_name, first_id);
            n_args = 1;
        }

        self.tokens.expect_value("(")?;
        n_args += self.compile_expression_list()?;
        self.tokens.expect_value(")")?;
        self.writer.write_call(&full_name, n_args);
        Ok(())
    }

    fn compile_expression_list(&mut self) -> Result<u16, JackError> {
        let mut count = 0u16;
        if self.peek_lexeme() != Some(")") {
            self.compile_expression()?;
            count = 1;
            while self.peek_lexeme() == Some(",") {
                self.tokens.advance();
                self.compile_expression()?;
                count += 1;
            }
        }
        Ok(count)
    }
}

fn is_binary_op(lexeme: &str) -> bool {
    matches!(lexeme, "+" | "-" | "*" | "/" | "&" | "|" | "<" | ">" | "=")
}

/// Compiles one `.jack` compilation unit's source text to a stream of VM
/// lines, signaling failure through `JackError` rather than panicking.
pub fn compile_source(source: &str) -> Result<String, JackError> {
    CompilationEngine::new(source)?.compile()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn let_statement_pushes_constant_and_pops_local() {
        let vm = compile_source(
            "class Main {\n\
             function void run() {\n\
               var int a, b, x;\n\
               let x = 0;\n\
               return;\n\
             }\n\
             }",
        )
        .unwrap();
        assert!(vm.contains("push constant 0\npop local 2\n"));
    }

    #[test]
    fn if_without_else_emits_consistent_labels() {
        let vm = compile_source(
            "class Main {\n\
             function void run() {\n\
               var int x, y;\n\
               if (x) {\n\
                 let y = 1;\n\
               }\n\
               return;\n\
             }\n\
             }",
        )
        .unwrap();
        assert!(vm.contains("push local 0\nnot\nif-goto IF_FALSE_1\n"));
        assert!(vm.contains("push constant 1\npop local 1\ngoto IF_END_1\nlabel IF_FALSE_1\nlabel IF_END_1\n"));
    }

    #[test]
    fn constructor_allocates_field_count() {
        let vm = compile_source(
            "class Point {\n\
               field int x, y;\n\
               constructor Point new() {\n\
                 return this;\n\
               }\n\
             }",
        )
        .unwrap();
        assert!(vm.contains("function Point.new 0\n"));
        assert!(vm.contains("push constant 2\ncall Memory.alloc 1\npop pointer 0\n"));
        assert!(vm.contains("push pointer 0\nreturn\n"));
    }

    #[test]
    fn do_statement_discards_call_result() {
        let vm = compile_source(
            "class Main {\n\
             function void run() {\n\
               do Output.printInt(42);\n\
               return;\n\
             }\n\
             }",
        )
        .unwrap();
        assert!(vm.contains("push constant 42\ncall Output.printInt 1\npop temp 0\n"));
    }

    #[test]
    fn method_call_on_field_pushes_receiver_first() {
        let vm = compile_source(
            "class Main {\n\
               field Ball obj;\n\
               method void run(int x, int y) {\n\
                 do obj.move(x, y);\n\
                 return;\n\
               }\n\
             }",
        )
        .unwrap();
        assert!(vm.contains(
            "push this 0\npush argument 1\npush argument 2\ncall Ball.move 3\npop temp 0\n"
        ));
    }

    #[test]
    fn array_assignment_uses_temp_shuffle() {
        let vm = compile_source(
            "class Main {\n\
             function void run() {\n\
               var Array a;\n\
               var int i, j;\n\
               let a[i] = a[j];\n\
               return;\n\
             }\n\
             }",
        )
        .unwrap();
        assert!(vm.contains(
            "push local 1\npush local 0\nadd\n\
             push local 2\npush local 0\nadd\npop pointer 1\npush that 0\n\
             pop temp 0\npop pointer 1\npush temp 0\npop that 0\n"
        ));
    }

    #[test]
    fn string_literal_appends_each_character() {
        let vm = compile_source(
            "class Main {\n\
             function void run() {\n\
               do Output.printString(\"hi\");\n\
               return;\n\
             }\n\
             }",
        )
        .unwrap();
        assert!(vm.contains(
            "push constant 2\ncall String.new 1\n\
             push constant 104\ncall String.appendChar 2\n\
             push constant 105\ncall String.appendChar 2\n"
        ));
    }

    #[test]
    fn left_associative_subtraction() {
        let vm = compile_source(
            "class Main {\n\
             function void run() {\n\
               var int a, b, c;\n\
               do Output.printInt(a - b - c);\n\
               return;\n\
             }\n\
             }",
        )
        .unwrap();
        assert!(vm.contains("push local 0\npush local 1\nsub\npush local 2\nsub\n"));
    }

    #[test]
    fn method_receives_implicit_this_before_declared_params() {
        let vm = compile_source(
            "class Point {\n\
               field int x;\n\
               method int getX() {\n\
                 return x;\n\
               }\n\
             }",
        )
        .unwrap();
        assert!(vm.contains("function Point.getX 0\npush argument 0\npop pointer 0\npush this 0\nreturn\n"));
    }

    #[test]
    fn bare_call_is_internal_method_with_implicit_receiver() {
        let vm = compile_source(
            "class Main {\n\
               method void helper() {\n\
                 return;\n\
               }\n\
               method void run() {\n\
                 do helper();\n\
                 return;\n\
               }\n\
             }",
        )
        .unwrap();
        assert!(vm.contains("push pointer 0\ncall Main.helper 1\npop temp 0\n"));
    }

    #[test]
    fn syntax_error_reports_line_and_mismatch() {
        let err = compile_source("class Main int x; }").unwrap_err();
        match err {
            JackError::UnexpectedToken { line, expected, found } => {
                assert_eq!(line, 1);
                assert_eq!(expected, "{");
                assert_eq!(found, "int");
            }
            other => panic!("expected UnexpectedToken, got {other:?}"),
        }
    }
}
