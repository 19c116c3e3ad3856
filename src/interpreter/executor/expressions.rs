//! Expression evaluation.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{Expr, ExprId, ExprKind, LiteralValue};
use crate::error::RuntimeError;
use crate::interpreter::builtins;
use crate::interpreter::class::Method;
use crate::interpreter::environment::Environment;
use crate::interpreter::value::{BuiltinInstance, Function, MapData, Value};
use crate::lexer::{Token, TokenKind};

use super::{Interpreter, RuntimeResult};

impl Interpreter {
    /// Evaluate an expression. A bare variable holding an import yields the
    /// reference itself; use [`Interpreter::evaluate_value`] to see through it.
    pub(crate) fn evaluate(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::number(*n),
                LiteralValue::String(s) => Value::string(s.as_str()),
                LiteralValue::Bool(b) => Value::boolean(*b),
                LiteralValue::Null => Value::Null,
            }),

            ExprKind::Variable(name) => self.look_up_variable(name, expr.id),

            ExprKind::Assign { name, value } => {
                let value = self.evaluate_value(value)?;
                self.assign_variable(name, expr.id, value.clone())?;
                Ok(value)
            }

            ExprKind::Grouping(inner) => self.evaluate_value(inner),

            ExprKind::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate_value(left)?;
                let right = self.evaluate_value(right)?;
                self.binary_operation(left, operator, right)
            }

            ExprKind::Unary { operator, right } => {
                let operand = self.evaluate_value(right)?;
                self.unary_operation(operator, operand)
            }

            ExprKind::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate_value(left)?;
                let short_circuit = match operator.kind {
                    TokenKind::Or => left.is_truthy(),
                    _ => !left.is_truthy(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate_value(right)
                }
            }

            ExprKind::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren, arguments),

            ExprKind::Get { object, name } => self.evaluate_get(object, name),

            ExprKind::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate_value(object)?;
                let Value::Instance(instance) = object else {
                    return Err(RuntimeError::new("Only instances have fields.", name).into());
                };
                let value = self.evaluate_value(value)?;
                instance
                    .borrow_mut()
                    .fields
                    .insert(name.lexeme.clone(), value.clone());
                Ok(value)
            }

            ExprKind::GetItem {
                object,
                bracket,
                index,
            } => {
                let object = self.evaluate_value(object)?;
                let index = self.evaluate_value(index)?;
                self.index_get(object, index, bracket)
            }

            ExprKind::SetItem {
                object,
                index,
                equals,
                value,
            } => {
                let object = self.evaluate_value(object)?;
                let index = self.evaluate_value(index)?;
                let value = self.evaluate_value(value)?;
                self.index_set(object, index, value.clone(), equals)?;
                Ok(value)
            }

            ExprKind::This(keyword) => self.look_up_variable(keyword, expr.id),

            ExprKind::Super {
                keyword,
                class_name,
                method,
            } => self.evaluate_super(expr.id, keyword, class_name, method),

            ExprKind::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.evaluate_value(element)?);
                }
                Ok(Value::array(items))
            }

            ExprKind::Map(entries) => {
                let mut map = MapData::default();
                for (key, value) in entries {
                    let value = self.evaluate_value(value)?;
                    map.insert(Value::string(key.lexeme.as_str()), value);
                }
                Ok(Value::Builtin(BuiltinInstance::Map(Rc::new(RefCell::new(map)))))
            }

            ExprKind::Lambda(decl) => Ok(Value::Function(Rc::new(Function::new(
                decl.clone(),
                self.environment.clone(),
                self.active_module()?,
            )))),
        }
    }

    /// Evaluate and see through imported references.
    pub(crate) fn evaluate_value(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        let value = self.evaluate(expr)?;
        Ok(self.deref(value)?)
    }

    fn look_up_variable(&self, name: &Token, id: ExprId) -> RuntimeResult<Value> {
        let module = self.active_module()?;
        match self.modules.node(module).locals.get(&id) {
            Some(distance) => Ok(Environment::get_at(
                &self.environment,
                *distance,
                &name.lexeme,
            )?),
            None => Ok(self.globals()?.borrow().get(name)?),
        }
    }

    fn assign_variable(&self, name: &Token, id: ExprId, value: Value) -> RuntimeResult<()> {
        let module = self.active_module()?;
        match self.modules.node(module).locals.get(&id) {
            Some(distance) => {
                Environment::assign_at(&self.environment, *distance, name, value)?
            }
            None => self.globals()?.borrow_mut().assign(name, value)?,
        }
        Ok(())
    }

    /// `object.name`: fields first, then methods bound to the receiver.
    fn evaluate_get(&mut self, object: &Expr, name: &Token) -> RuntimeResult<Value> {
        let object = self.evaluate(object)?;
        if let Value::Imported(import) = &object {
            let target = self.deref(object.clone())?;
            let previous = self.active.replace(import.module);
            let result = self.get_property(&target, name);
            self.active = previous;
            if let Ok(value) = &result {
                import.refresh(value.clone());
            }
            return result;
        }
        self.get_property(&object, name)
    }

    pub(crate) fn get_property(&self, object: &Value, name: &Token) -> RuntimeResult<Value> {
        match object {
            Value::Instance(instance) => {
                let inst = instance.borrow();
                if let Some(value) = inst.fields.get(&name.lexeme) {
                    return Ok(value.clone());
                }
                match inst.class.find_method(&name.lexeme, true) {
                    Some(Method::User(method)) => {
                        let bound = method.bind(Value::Instance(instance.clone()));
                        return Ok(Value::Function(Rc::new(bound)));
                    }
                    Some(Method::Builtin(class)) => {
                        if let Some(native) = inst.native(class) {
                            if let Some(method) =
                                builtins::bind_method(native, &name.lexeme, &self.output)
                            {
                                return Ok(method);
                            }
                        }
                    }
                    None => {}
                }
                inst.natives
                    .iter()
                    .find_map(|(_, native)| builtins::field(native, &name.lexeme))
                    .ok_or_else(|| RuntimeError::UndefinedProperty(name.clone()).into())
            }
            Value::Builtin(builtin) => builtins::get_property(builtin, &name.lexeme, &self.output)
                .ok_or_else(|| RuntimeError::UndefinedProperty(name.clone()).into()),
            _ => Err(RuntimeError::new("Only instances have properties.", name).into()),
        }
    }

    fn index_get(&mut self, object: Value, index: Value, bracket: &Token) -> RuntimeResult<Value> {
        if !matches!(object, Value::Instance(_) | Value::Builtin(_)) {
            return Err(RuntimeError::new("Only instances have properties.", bracket).into());
        }
        if !self.has_method(&object, "__getitem__") {
            return Err(RuntimeError::new("Invalid get operation.", bracket).into());
        }
        self.call_method(&object, "__getitem__", vec![index], bracket)
    }

    fn index_set(
        &mut self,
        object: Value,
        index: Value,
        value: Value,
        equals: &Token,
    ) -> RuntimeResult<()> {
        if !matches!(object, Value::Instance(_) | Value::Builtin(_)) {
            return Err(RuntimeError::new(
                "Only able to set indexed values on instances",
                equals,
            )
            .into());
        }
        if !self.has_method(&object, "__setitem__") {
            return Err(RuntimeError::new("Invalid set operation.", equals).into());
        }
        self.call_method(&object, "__setitem__", vec![index, value], equals)?;
        Ok(())
    }
}
