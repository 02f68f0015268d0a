use std::io::Write;
use std::str::FromStr;

/// Ask the user interactively for some single-line value in the terminal. The user's input is
/// converted to type [T] and validated with the provided validation_function. In case of a parsing
/// error or validation error, the error is printed and the user is queried again and again with
/// same prompt until the entered value is valid.
///
/// Only failures of the terminal itself (e.g. closed stdin) are returned as error.
pub fn query_user_and_check<T: FromStr, F, E>(
    prompt: &str,
    validation_function: F,
) -> Result<T, std::io::Error>
where
    <T as FromStr>::Err: std::fmt::Display,
    F: Fn(&T) -> Result<(), E>,
    E: std::fmt::Display,
{
    loop {
        let user_input = read_line(prompt)?;
        let value = match user_input.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                println!("Error: {}", e);
                continue;
            }
        };
        match validation_function(&value) {
            Ok(()) => return Ok(value),
            Err(e) => {
                println!("Error: {}", e);
            }
        }
    }
}

/// Ask the user interactively for a boolean value in the terminal (entered as y/n). In case of an
/// invalid input, the user is queried again and again with same prompt until the entered value is
/// parsed successfully.
pub fn query_user_bool(prompt: &str, default: Option<bool>) -> Result<bool, std::io::Error> {
    let value_help = match default {
        Some(true) => "Y/n",
        Some(false) => "y/N",
        None => "y/n",
    };
    loop {
        let user_input = read_line(&format!("{} [{}]", prompt, value_help))?;
        match user_input.trim().to_lowercase().as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            "" => {
                if let Some(default) = default {
                    return Ok(default);
                }
            }
            _ => {}
        }
        println!("Error: unknown option. Please enter 'y' or 'n'.");
    }
}

fn read_line(prompt: &str) -> Result<String, std::io::Error> {
    println!("{}:", prompt);
    print!("> ");
    std::io::stdout().flush()?;
    let mut user_input = String::new();
    if std::io::stdin().read_line(&mut user_input)? == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "Input closed",
        ));
    }
    Ok(user_input)
}
