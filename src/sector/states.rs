use crate::types::StateCode;

/// Normalize a federative-unit name to its two-letter code.
///
/// Accent-insensitive ("São Paulo" and "Sao Paulo" both map to `sp`) and
/// accepts an already-lowercased code. Returns `None` for anything outside
/// the fixed table; callers treat that as an unsupported region.
pub fn state_name_to_code(name: &str) -> Option<StateCode> {
    let folded = fold(name);
    let code = match folded.as_str() {
        "acre" | "ac" => "ac",
        "alagoas" | "al" => "al",
        "amapa" | "ap" => "ap",
        "amazonas" | "am" => "am",
        "bahia" | "ba" => "ba",
        "ceara" | "ce" => "ce",
        "distrito federal" | "df" => "df",
        "espirito santo" | "es" => "es",
        "goias" | "go" => "go",
        "maranhao" | "ma" => "ma",
        "mato grosso" | "mt" => "mt",
        "mato grosso do sul" | "ms" => "ms",
        "minas gerais" | "mg" => "mg",
        "para" | "pa" => "pa",
        "paraiba" | "pb" => "pb",
        "parana" | "pr" => "pr",
        "pernambuco" | "pe" => "pe",
        "piaui" | "pi" => "pi",
        "rio de janeiro" | "rj" => "rj",
        "rio grande do norte" | "rn" => "rn",
        "rio grande do sul" | "rs" => "rs",
        "rondonia" | "ro" => "ro",
        "roraima" | "rr" => "rr",
        "santa catarina" | "sc" => "sc",
        "sao paulo" | "sp" => "sp",
        "sergipe" | "se" => "se",
        "tocantins" | "to" => "to",
        _ => return None,
    };
    Some(StateCode(code))
}

/// Full name for a code, for log and download messages.
pub fn state_code_to_name(code: StateCode) -> &'static str {
    match code.as_str() {
        "ac" => "Acre",
        "al" => "Alagoas",
        "ap" => "Amapá",
        "am" => "Amazonas",
        "ba" => "Bahia",
        "ce" => "Ceará",
        "df" => "Distrito Federal",
        "es" => "Espírito Santo",
        "go" => "Goiás",
        "ma" => "Maranhão",
        "mt" => "Mato Grosso",
        "ms" => "Mato Grosso do Sul",
        "mg" => "Minas Gerais",
        "pa" => "Pará",
        "pb" => "Paraíba",
        "pr" => "Paraná",
        "pe" => "Pernambuco",
        "pi" => "Piauí",
        "rj" => "Rio de Janeiro",
        "rn" => "Rio Grande do Norte",
        "rs" => "Rio Grande do Sul",
        "ro" => "Rondônia",
        "rr" => "Roraima",
        "sc" => "Santa Catarina",
        "sp" => "São Paulo",
        "se" => "Sergipe",
        "to" => "Tocantins",
        _ => "unknown",
    }
}

/// Lowercase and strip the Portuguese diacritics that occur in state names.
fn fold(name: &str) -> String {
    name.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'â' | 'ã' | 'à' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accented_and_plain_spellings_agree() {
        assert_eq!(state_name_to_code("São Paulo"), state_name_to_code("Sao Paulo"));
        assert_eq!(state_name_to_code("São Paulo").unwrap().as_str(), "sp");
        assert_eq!(state_name_to_code("Distrito Federal").unwrap().as_str(), "df");
        assert_eq!(state_name_to_code("Espírito Santo").unwrap().as_str(), "es");
    }

    #[test]
    fn codes_are_accepted_directly() {
        assert_eq!(state_name_to_code("SP").unwrap().as_str(), "sp");
        assert_eq!(state_name_to_code("rj").unwrap().as_str(), "rj");
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(state_name_to_code("Buenos Aires"), None);
        assert_eq!(state_name_to_code(""), None);
    }

    #[test]
    fn names_round_trip_through_codes() {
        let code = state_name_to_code("Mato Grosso do Sul").unwrap();
        assert_eq!(state_code_to_name(code), "Mato Grosso do Sul");
    }
}
