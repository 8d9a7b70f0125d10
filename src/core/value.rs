/*!
 * Runtime Values
 * Dynamically typed values exchanged between processes, channels and the host
 */

use crate::ipc::Channel;
use crate::process::Task;
use smartstring::alias::String as SmartString;
use std::fmt;

/// A value passed through channels, yielded by computations, or used to
/// resume them.
///
/// `Null` doubles as the "no value" resume input (put, cancel) and as the
/// terminal signal some workloads send over a channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(SmartString),
    List(Vec<Value>),
    /// Handle of a process, as produced by fork/spawn
    Task(Task),
    /// Shared channel reference (clones refer to the same channel)
    Channel(Channel),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value; integers are widened
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_task(&self) -> Option<Task> {
        match self {
            Value::Task(task) => Some(*task),
            _ => None,
        }
    }

    #[inline]
    pub fn as_channel(&self) -> Option<&Channel> {
        match self {
            Value::Channel(channel) => Some(channel),
            _ => None,
        }
    }

    /// Short name of the variant, for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Task(_) => "task",
            Value::Channel(_) => "channel",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Task(task) => write!(f, "{}", task),
            Value::Channel(channel) => write!(f, "channel#{}", channel.id()),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Task> for Value {
    fn from(task: Task) -> Self {
        Value::Task(task)
    }
}

impl From<Channel> for Value {
    fn from(channel: Channel) -> Self {
        Value::Channel(channel)
    }
}

impl From<&Channel> for Value {
    fn from(channel: &Channel) -> Self {
        Value::Channel(channel.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
