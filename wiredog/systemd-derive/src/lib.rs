/*!
Derive macros that render structs as `systemd` unit files.

## Description

`SystemdUnit` is derived on the struct that represents a whole file (for `wiredog`, a
systemd-networkd `.network` or `.netdev` file).  Each of its fields is a section.  `SystemdUnitSection` is
derived on the structs that represent those sections; each of their fields is a `Key=value` entry.

Both macros implement `Display`, so the generated file is simply `to_string()` of the top-level
struct.  Sections are written in field order and separated by a single blank line.  Entries are
written in field order.

Every field must be an `Option` or a `Vec` of something that implements `Display`.  `None` and
empty `Vec`s produce no output at all, which is how "unset" values stay out of the file.  A `Vec`
of sections produces a repeated section (e.g. one `[Address]` per address) and a `Vec` of entries
produces a repeated key, unless the field is marked `space_separated`.

## Parameters

`SystemdUnit` takes no parameters.

`SystemdUnitSection` requires:
- `section`: the section name, set on the struct.  Brackets are added for you.
- `entry`: the key name, set on each field.

and optionally accepts:
- `space_separated`: set on a field to write all of its values on one line, joined by a space.
  The line is skipped when there are no values.

## Example

```ignore
use systemd_derive::{SystemdUnit, SystemdUnitSection};

#[derive(Debug, Default, SystemdUnit)]
struct NetworkConfig {
    r#match: Option<MatchSection>,
    network: Option<NetworkSection>,
    address: Vec<AddressSection>,
}

#[derive(Debug, Default, SystemdUnitSection)]
#[systemd(section = "Match")]
struct MatchSection {
    #[systemd(entry = "Name")]
    name: Option<String>,
}

#[derive(Debug, Default, SystemdUnitSection)]
#[systemd(section = "Network")]
struct NetworkSection {
    #[systemd(entry = "DHCP")]
    dhcp: Option<String>,
    #[systemd(entry = "DNS", space_separated)]
    dns: Vec<String>,
}

#[derive(Debug, Default, SystemdUnitSection)]
#[systemd(section = "Address")]
struct AddressSection {
    #[systemd(entry = "Address")]
    address: Option<String>,
}

let cfg = NetworkConfig {
    r#match: Some(MatchSection {
        name: Some("eth0".to_string()),
    }),
    network: Some(NetworkSection {
        dhcp: Some("ipv4".to_string()),
        dns: vec!["1.1.1.1".to_string(), "8.8.8.8".to_string()],
    }),
    address: vec![
        AddressSection {
            address: Some("10.0.0.2/24".to_string()),
        },
        AddressSection {
            address: Some("10.0.0.3/24".to_string()),
        },
    ],
};

print!("{}", cfg);
```

prints:

```ignore
[Match]
Name=eth0

[Network]
DHCP=ipv4
DNS=1.1.1.1 8.8.8.8

[Address]
Address=10.0.0.2/24

[Address]
Address=10.0.0.3/24
```
*/

use darling::{ast, FromDeriveInput, FromField, ToTokens};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Ident};

/// Derive `Display` for a struct whose fields are unit file sections.
#[proc_macro_derive(SystemdUnit)]
pub fn derive_systemd_unit(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    match SystemdUnit::from_derive_input(&ast) {
        Ok(unit) => quote!(#unit).into(),
        Err(e) => e.write_errors().into(),
    }
}

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named))]
struct SystemdUnit {
    pub ident: Ident,
    pub data: ast::Data<(), SystemdSection>,
}

#[derive(Debug, FromField)]
struct SystemdSection {
    ident: Option<Ident>,
}

impl ToTokens for SystemdUnit {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let SystemdUnit { ident, data } = self;

        let sections: Vec<Ident> = data
            .as_ref()
            .take_struct()
            // supports(struct_named) guarantees a struct
            .expect("Will never be anything but a struct")
            .fields
            .iter()
            .filter_map(|f| f.ident.clone())
            .collect();

        tokens.extend(quote! {
            impl std::fmt::Display for #ident {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    let mut rendered: Vec<String> = Vec::new();
                    // `Vec`s and `Option`s both have `iter()`, so one loop covers both
                    #(for section in self.#sections.iter() {
                        rendered.push(section.to_string());
                    })*
                    write!(f, "{}", rendered.join("\n"))
                }
            }
        });
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// Derive `Display` for a struct whose fields are the entries of a single section.
#[proc_macro_derive(SystemdUnitSection, attributes(systemd))]
pub fn derive_systemd_unit_section(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    match SystemdUnitSection::from_derive_input(&ast) {
        Ok(section) => quote!(#section).into(),
        Err(e) => e.write_errors().into(),
    }
}

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named))]
#[darling(attributes(systemd))]
struct SystemdUnitSection {
    pub ident: Ident,
    pub data: ast::Data<(), SystemdUnitSectionField>,
    #[darling(rename = "section")]
    pub section_name: String,
}

#[derive(Debug, FromField)]
#[darling(attributes(systemd))]
struct SystemdUnitSectionField {
    ident: Option<Ident>,
    entry: String,
    #[darling(default)]
    space_separated: bool,
}

impl ToTokens for SystemdUnitSection {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let SystemdUnitSection {
            ident,
            data,
            section_name,
        } = self;

        let entries = data
            .as_ref()
            .take_struct()
            // supports(struct_named) guarantees a struct
            .expect("Will never be anything but a struct")
            .fields;

        // The brackets are ours to add
        let section_name = section_name.replace(['[', ']'], "");

        tokens.extend(quote! {
            impl std::fmt::Display for #ident {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    writeln!(f, "[{}]", #section_name)?;
                    #(#entries)*
                    Ok(())
                }
            }
        });
    }
}

impl ToTokens for SystemdUnitSectionField {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let field_name = self.ident.as_ref().expect("Should always have a name");
        let entry_name = &self.entry;

        let field = if self.space_separated {
            // Works for `Option` too, which yields at most one value
            quote! {
                let joined = self
                    .#field_name
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<String>>()
                    .join(" ");
                if !joined.is_empty() {
                    writeln!(f, "{}={}", #entry_name, joined)?;
                }
            }
        } else {
            quote! {
                for value in self.#field_name.iter() {
                    writeln!(f, "{}={}", #entry_name, value)?;
                }
            }
        };

        tokens.extend(field)
    }
}
