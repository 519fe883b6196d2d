use std::collections::HashMap;

use crate::models::{BinOp, Block, Expr, Program, Statement};

/// Where an evaluated expression lives: an immediate value or a named
/// dword slot in the data section (a variable or a temporary).
enum Operand {
    Constant(i32),
    Slot(String),
}

/// Emits a 32-bit flat-model listing from the tree. Expressions evaluate
/// through `eax`, every binary operation lands in a fresh temporary slot.
pub struct CodeGenerator {
    code: Vec<String>,
    data: Vec<String>,
    variable_map: HashMap<String, String>,
    label_counter: usize,
    temp_counter: usize,
}

impl CodeGenerator {
    pub fn new() -> Self {
        CodeGenerator {
            code: Vec::new(),
            data: Vec::new(),
            variable_map: HashMap::new(),
            label_counter: 0,
            temp_counter: 0,
        }
    }

    /// Produces the complete listing. Counters and slot maps reset per
    /// call, so the same tree always yields the same text.
    pub fn generate(&mut self, program: &Program) -> Vec<String> {
        self.code.clear();
        self.data.clear();
        self.variable_map.clear();
        self.label_counter = 0;
        self.temp_counter = 0;

        for variable in &program.variables {
            self.slot(variable);
        }
        self.gen_block(&program.body);

        self.assemble(&program.name)
    }

    fn assemble(&self, name: &str) -> Vec<String> {
        let mut listing = vec![
            "; =========================================".to_string(),
            format!("; Generated assembly for program {}", name),
            "; =========================================".to_string(),
            String::new(),
            ".386".to_string(),
            ".model flat, stdcall".to_string(),
            "option casemap :none".to_string(),
            String::new(),
            "includelib kernel32.lib".to_string(),
            "includelib msvcrt.lib".to_string(),
            String::new(),
            "extern printf:proc".to_string(),
            "extern scanf:proc".to_string(),
            String::new(),
            ".data".to_string(),
            "  fmt_int_out db '%d', 0".to_string(),
            "  fmt_int_in db '%d', 0".to_string(),
            "  newline db 10, 0".to_string(),
        ];
        listing.extend(self.data.iter().cloned());
        listing.extend([
            String::new(),
            ".code".to_string(),
            String::new(),
            "print_int proc value:dword".to_string(),
            "  push ebp".to_string(),
            "  mov ebp, esp".to_string(),
            "  push value".to_string(),
            "  push offset fmt_int_out".to_string(),
            "  call printf".to_string(),
            "  add esp, 8".to_string(),
            "  pop ebp".to_string(),
            "  ret".to_string(),
            "print_int endp".to_string(),
            String::new(),
            "read_int proc".to_string(),
            "  push ebp".to_string(),
            "  mov ebp, esp".to_string(),
            "  sub esp, 4".to_string(),
            "  lea eax, [ebp-4]".to_string(),
            "  push eax".to_string(),
            "  push offset fmt_int_in".to_string(),
            "  call scanf".to_string(),
            "  add esp, 8".to_string(),
            "  mov eax, [ebp-4]".to_string(),
            "  mov esp, ebp".to_string(),
            "  pop ebp".to_string(),
            "  ret".to_string(),
            "read_int endp".to_string(),
            String::new(),
            "print_nl proc".to_string(),
            "  push offset newline".to_string(),
            "  call printf".to_string(),
            "  add esp, 4".to_string(),
            "  ret".to_string(),
            "print_nl endp".to_string(),
            String::new(),
            "main proc".to_string(),
            String::new(),
        ]);
        listing.extend(self.code.iter().cloned());
        listing.extend([
            String::new(),
            "  mov eax, 0".to_string(),
            "  ret".to_string(),
            "main endp".to_string(),
            String::new(),
            "end main".to_string(),
        ]);
        listing
    }

    fn gen_block(&mut self, block: &Block) {
        for statement in &block.statements {
            self.gen_statement(statement);
        }
    }

    fn gen_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Assignment { name, expr } => {
                let target = self.slot(name);
                self.emit(format!("  ; let {}", name));
                match self.gen_expression(expr) {
                    Operand::Constant(value) => {
                        self.emit(format!("  mov dword ptr [{}], {}", target, value));
                    }
                    Operand::Slot(source) => {
                        self.emit(format!("  mov eax, [{}]", source));
                        self.emit(format!("  mov [{}], eax", target));
                    }
                }
            }
            Statement::Input { name } => {
                let target = self.slot(name);
                self.emit(format!("  ; input {}", name));
                self.emit("  call read_int".to_string());
                self.emit(format!("  mov [{}], eax", target));
            }
            Statement::Output { expr } => {
                self.emit("  ; output".to_string());
                match self.gen_expression(expr) {
                    Operand::Constant(value) => self.emit(format!("  push {}", value)),
                    Operand::Slot(source) => {
                        self.emit(format!("  push dword ptr [{}]", source));
                    }
                }
                self.emit("  call print_int".to_string());
                self.emit("  call print_nl".to_string());
            }
            Statement::While { condition, body } => {
                let start = self.new_label("while_start");
                let end = self.new_label("while_end");
                self.emit(format!("{}:", start));
                self.gen_condition(condition);
                self.emit(format!("  je {}", end));
                self.gen_block(body);
                self.emit(format!("  jmp {}", start));
                self.emit(format!("{}:", end));
            }
            Statement::For {
                init,
                condition,
                increment,
                body,
            } => {
                let start = self.new_label("for_start");
                let end = self.new_label("for_end");
                let inc = self.new_label("for_inc");
                if let Some(init) = init {
                    self.gen_statement(init);
                }
                self.emit(format!("{}:", start));
                self.gen_condition(condition);
                self.emit(format!("  je {}", end));
                self.gen_block(body);
                self.emit(format!("{}:", inc));
                if let Some(increment) = increment {
                    self.gen_statement(increment);
                }
                self.emit(format!("  jmp {}", start));
                self.emit(format!("{}:", end));
            }
            Statement::If {
                condition,
                then_block,
            } => {
                let end = self.new_label("if_end");
                self.gen_condition(condition);
                self.emit(format!("  je {}", end));
                self.gen_block(then_block);
                self.emit(format!("{}:", end));
            }
            Statement::IfElse {
                condition,
                then_block,
                else_block,
            } => {
                let else_label = self.new_label("if_else");
                let end = self.new_label("if_end");
                self.gen_condition(condition);
                self.emit(format!("  je {}", else_label));
                self.gen_block(then_block);
                self.emit(format!("  jmp {}", end));
                self.emit(format!("{}:", else_label));
                self.gen_block(else_block);
                self.emit(format!("{}:", end));
            }
            Statement::Block(block) => self.gen_block(block),
        }
    }

    /// Evaluates the condition into `eax` and compares against zero;
    /// zero is false.
    fn gen_condition(&mut self, condition: &Expr) {
        match self.gen_expression(condition) {
            Operand::Constant(value) => self.emit(format!("  mov eax, {}", value)),
            Operand::Slot(source) => self.emit(format!("  mov eax, [{}]", source)),
        }
        self.emit("  cmp eax, 0".to_string());
    }

    fn gen_expression(&mut self, expr: &Expr) -> Operand {
        match expr {
            Expr::Identifier(name) => Operand::Slot(self.slot(name)),
            Expr::Constant(value) => Operand::Constant(*value),
            Expr::Binary { op, left, right } => {
                let left = self.gen_expression(left);
                let right = self.gen_expression(right);
                let temp = self.new_temp();

                match left {
                    Operand::Constant(value) => self.emit(format!("  mov eax, {}", value)),
                    Operand::Slot(source) => self.emit(format!("  mov eax, [{}]", source)),
                }
                match op {
                    BinOp::Add => self.apply("add", &right),
                    BinOp::Sub => self.apply("sub", &right),
                    BinOp::Mul => self.apply("imul", &right),
                    BinOp::Div => {
                        self.emit("  cdq".to_string());
                        match &right {
                            Operand::Constant(value) => {
                                self.emit(format!("  mov ebx, {}", value));
                                self.emit("  idiv ebx".to_string());
                            }
                            Operand::Slot(source) => {
                                self.emit(format!("  idiv dword ptr [{}]", source));
                            }
                        }
                    }
                }
                self.emit(format!("  mov [{}], eax", temp));
                Operand::Slot(temp)
            }
        }
    }

    fn apply(&mut self, mnemonic: &str, right: &Operand) {
        match right {
            Operand::Constant(value) => self.emit(format!("  {} eax, {}", mnemonic, value)),
            Operand::Slot(source) => self.emit(format!("  {} eax, [{}]", mnemonic, source)),
        }
    }

    fn emit(&mut self, line: String) {
        self.code.push(line);
    }

    /// Resolves a variable to its data-section slot, declaring the slot
    /// on first sight.
    fn slot(&mut self, variable: &str) -> String {
        if let Some(existing) = self.variable_map.get(variable) {
            return existing.clone();
        }
        let slot = format!("_{}", variable);
        self.data.push(format!("  {} dd 0", slot));
        self.variable_map
            .insert(variable.to_string(), slot.clone());
        slot
    }

    fn new_label(&mut self, prefix: &str) -> String {
        let label = format!("{}_{}", prefix, self.label_counter);
        self.label_counter += 1;
        label
    }

    fn new_temp(&mut self) -> String {
        let temp = format!("_temp{}", self.temp_counter);
        self.temp_counter += 1;
        self.data.push(format!("  {} dd 0", temp));
        temp
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        CodeGenerator::new()
    }
}
