// crates/upload-kit-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for English and Catalan output.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! Every line the Upload Kit CLI prints goes through a small translation
//! catalog so the English and Catalan renderings stay in step. All runtime
//! output should be routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
///
/// # Invariants
/// - Variants are stable for CLI parsing and catalog lookup.
/// - [`Locale::En`] is the default fallback locale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ca => "ca",
        }
    }

    /// Attempts to parse a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let normalized = value.to_ascii_lowercase();
        let lang = normalized.split(['-', '_', '.']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "ca" => Some(Self::Ca),
            _ => None,
        }
    }
}

/// Ordered list of supported CLI locales.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Ca];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"bucket"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "upload-kit {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.json_failed", "Failed to serialize JSON output: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("env.load_failed", "Failed to load env file {path}: {error}"),
    ("logging.init_failed", "Failed to initialize logging: {error}"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
    ("setup.banner", "🚀 Setting up S3 bucket for MCP file upload server..."),
    ("setup.credentials.header", "🔐 Checking AWS credentials..."),
    ("setup.credentials.account", "  ✅ AWS Account ID: {account}"),
    ("setup.credentials.arn", "  ✅ User/Role ARN: {arn}"),
    ("setup.credentials.failed", "  ❌ AWS credentials not configured: {error}"),
    ("setup.credentials.help.header", "🛠️ Please configure AWS credentials first:"),
    ("setup.credentials.help.option1", "   Option 1: aws configure"),
    (
        "setup.credentials.help.option2",
        "   Option 2: Set environment variables {access_key} and {secret_key}",
    ),
    ("setup.bucket.creating", "🪣 Creating S3 bucket: {bucket}"),
    ("setup.bucket.collision", "❌ Bucket name {bucket} already exists globally. Trying another..."),
    ("setup.bucket.region", "📍 Using region: {region}"),
    ("setup.bucket.created", "✅ Bucket created successfully!"),
    ("setup.bucket.create_failed", "❌ Error creating bucket: {error}"),
    ("setup.bucket.exhausted", "❌ No free bucket name after {attempts} attempts."),
    ("setup.bucket.invalid", "❌ Invalid provisioning settings: {error}"),
    ("setup.settings.header", "🔒 Configuring bucket security..."),
    ("setup.settings.public_access_block", "  ✅ Public access blocked"),
    ("setup.settings.versioning", "  ✅ Versioning enabled"),
    ("setup.settings.lifecycle", "  ✅ Lifecycle policy set ({days}-day retention)"),
    ("setup.settings.encryption", "  ✅ Server-side encryption enabled ({algorithm})"),
    ("setup.settings.failed", "  ⚠️ Warning: Could not configure some settings: {error}"),
    ("setup.probe.header", "🧪 Testing bucket access..."),
    ("setup.probe.write", "  ✅ Write access confirmed"),
    ("setup.probe.read", "  ✅ Read access confirmed"),
    ("setup.probe.presign", "  ✅ Presigned URL generation confirmed"),
    ("setup.probe.cleanup", "  ✅ Test cleanup completed"),
    ("setup.probe.failed", "  ❌ Access test failed: {error}"),
    ("setup.probe.cleanup_failed", "  ⚠️ Warning: Could not delete test object: {error}"),
    ("setup.complete", "🎉 Setup complete!"),
    ("setup.bucket_name", "📋 Bucket name: {bucket}"),
    ("setup.launch.header", "🔧 Use this command to start your MCP server:"),
    ("setup.launch.command", "   {hint} --bucket {bucket} --root /path/to/your/upload/folder"),
    ("setup.save_name", "📝 Save this bucket name: {bucket}"),
    ("setup.next", "🔄 You can now test your MCP server!"),
    ("setup.failed", "❌ Setup failed. Please check your AWS permissions."),
    ("check.banner", "🧪 AWS S3 Connection Test"),
    ("check.intro", "📋 This check will test your AWS credentials from {env_file}"),
    ("check.source", "🔐 Testing AWS credentials from {env_file} file..."),
    ("check.missing.header", "❌ Missing required environment variables:"),
    ("check.missing.item", "   - {var}"),
    ("check.missing.template_header", "💡 Create a {env_file} file with the following format:"),
    ("check.step.credentials", "{marker} Testing AWS credentials..."),
    ("check.credentials.valid", "   ✅ Credentials valid!"),
    ("check.credentials.account", "   🆔 Account ID: {account}"),
    ("check.credentials.arn", "   👤 User ARN: {arn}"),
    ("check.step.client", "{marker} Testing S3 client..."),
    ("check.client.ok", "   ✅ S3 client created successfully!"),
    ("check.client.region", "   🌍 Region: {region}"),
    ("check.step.bucket", "{marker} Testing access to bucket '{bucket}'..."),
    ("check.bucket.ok", "   ✅ Bucket '{bucket}' exists and is accessible!"),
    ("check.bucket.not_found", "   ❌ Bucket '{bucket}' does not exist!"),
    ("check.bucket.denied", "   ❌ Access denied to bucket '{bucket}'!"),
    ("check.bucket.denied_hint", "   💡 Check your IAM user permissions"),
    ("check.bucket.failed", "   ❌ Error accessing bucket: {error}"),
    ("check.step.upload", "{marker} Testing upload permission..."),
    ("check.upload.ok", "   ✅ Upload permission confirmed!"),
    ("check.upload.failed", "   ❌ Upload failed: {error}"),
    ("check.step.download", "{marker} Testing download permission..."),
    ("check.download.ok", "   ✅ Download permission confirmed!"),
    ("check.download.mismatch", "   ❌ Downloaded content doesn't match!"),
    ("check.download.failed", "   ❌ Download failed: {error}"),
    ("check.step.presign", "{marker} Testing presigned URL generation..."),
    ("check.presign.ok", "   ✅ Presigned URL generated successfully!"),
    ("check.presign.url", "   🔗 URL: {url}"),
    ("check.presign.failed", "   ❌ Presigned URL generation failed: {error}"),
    ("check.step.cleanup", "{marker} Cleaning up test file..."),
    ("check.cleanup.ok", "   ✅ Test file deleted!"),
    ("check.cleanup.failed", "   ⚠️ Warning: Could not delete test file: {error}"),
    ("check.error.invalid_key", "❌ Invalid AWS Access Key ID!"),
    ("check.error.invalid_secret", "❌ Invalid AWS Secret Access Key!"),
    ("check.error.no_credentials", "❌ AWS credentials not found or invalid!"),
    ("check.error.other", "❌ AWS Error: {error}"),
    ("check.passed", "🎉 All tests passed! Your AWS setup is working correctly."),
    ("check.launch.header", "🚀 You can now run your MCP server with:"),
    ("check.launch.command", "   {hint} --bucket {bucket} --root /path/to/upload/folder"),
    ("check.ready", "✅ Setup is ready for MCP server!"),
    ("check.failed", "❌ Please fix the issues above before running the MCP server."),
    ("check.help.header", "💡 Need help?"),
    ("check.help.env_file", "   1. Check your {env_file} file has the correct credentials"),
    ("check.help.permissions", "   2. Verify your IAM user has S3 permissions"),
    ("check.help.bucket", "   3. Confirm your bucket name is correct"),
    ("mcp.smoke.banner", "🚀 Starting MCP S3 upload server test..."),
    ("mcp.bucket_missing", "❌ {var} not found in {env_file}"),
    ("mcp.upload_root.failed", "❌ Failed to create upload directory {path}: {error}"),
    ("mcp.file.created", "📝 Created test file: {path}"),
    ("mcp.file.creating", "📝 Creating test file..."),
    ("mcp.file.created_size", "📏 Created test file: {size} bytes"),
    ("mcp.file.create_failed", "❌ Failed to create test file {path}: {error}"),
    ("mcp.file.cleaned", "🧹 Cleaned up test file"),
    ("mcp.file.cleanup_failed", "⚠️ Could not remove test file {path}: {error}"),
    ("mcp.connecting", "🔌 Connecting to MCP server..."),
    ("mcp.tools.header", "📋 Available tools:"),
    ("mcp.tools.item", "  • {name}: {description}"),
    ("mcp.tools.no_description", "(no description)"),
    ("mcp.upload.start", "📤 Testing file upload..."),
    ("mcp.upload.ok", "✅ Upload successful!"),
    ("mcp.upload.result", "📊 Result: {result}"),
    ("mcp.upload.url", "🔗 Presigned URL: {url}"),
    ("mcp.upload.size", "📏 File size: {size} bytes"),
    ("mcp.upload.mime", "🎭 MIME type: {mime_type}"),
    ("mcp.upload.key", "🔑 S3 key: {key}"),
    ("mcp.upload.bucket", "🪣 S3 bucket: {bucket}"),
    ("mcp.failed", "❌ Test failed: {error}"),
    ("mcp.progress.start", "🚀 Starting upload with progress tracking..."),
    ("mcp.progress.line", "📊 Progress: {label} {message}"),
    ("mcp.progress.done", "✅ Upload completed!"),
    ("mcp.progress.url", "🔗 URL: {url}"),
    ("mcp.progress.size", "📏 Final size: {size} bytes"),
    ("mcp.progress.bucket", "🪣 Uploaded to bucket: {bucket}"),
    ("mcp.progress.cleaned", "🧹 Test file cleaned up"),
    ("mcp.client.failed", "MCP request failed: {error}"),
    ("mcp.client.input_parse_failed", "Failed to parse tool input JSON: {error}"),
];

/// Static Catalan catalog entries.
const CATALOG_CA: &[(&str, &str)] = &[
    ("main.version", "upload-kit {version}"),
    ("output.stream.stdout", "sortida estàndard"),
    ("output.stream.stderr", "sortida d'error"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("output.json_failed", "No s'ha pogut serialitzar la sortida JSON: {error}"),
    ("config.load_failed", "No s'ha pogut carregar la configuració: {error}"),
    ("env.load_failed", "No s'ha pogut carregar el fitxer d'entorn {path}: {error}"),
    ("logging.init_failed", "No s'ha pogut inicialitzar el registre: {error}"),
    ("i18n.lang.invalid_env", "Valor no vàlid per a {env}: {value}. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida que no és en anglès està traduïda automàticament i pot ser inexacta.",
    ),
    ("setup.banner", "🚀 Configurant el bucket S3 per al servidor MCP de pujada de fitxers..."),
    ("setup.credentials.header", "🔐 Comprovant les credencials d'AWS..."),
    ("setup.credentials.account", "  ✅ ID del compte d'AWS: {account}"),
    ("setup.credentials.arn", "  ✅ ARN de l'usuari o rol: {arn}"),
    ("setup.credentials.failed", "  ❌ Les credencials d'AWS no estan configurades: {error}"),
    ("setup.credentials.help.header", "🛠️ Configura primer les credencials d'AWS:"),
    ("setup.credentials.help.option1", "   Opció 1: aws configure"),
    (
        "setup.credentials.help.option2",
        "   Opció 2: Defineix les variables d'entorn {access_key} i {secret_key}",
    ),
    ("setup.bucket.creating", "🪣 Creant el bucket S3: {bucket}"),
    (
        "setup.bucket.collision",
        "❌ El nom de bucket {bucket} ja existeix globalment. Provant-ne un altre...",
    ),
    ("setup.bucket.region", "📍 Regió utilitzada: {region}"),
    ("setup.bucket.created", "✅ Bucket creat correctament!"),
    ("setup.bucket.create_failed", "❌ Error en crear el bucket: {error}"),
    ("setup.bucket.exhausted", "❌ No hi ha cap nom de bucket lliure després de {attempts} intents."),
    ("setup.bucket.invalid", "❌ Configuració d'aprovisionament no vàlida: {error}"),
    ("setup.settings.header", "🔒 Configurant la seguretat del bucket..."),
    ("setup.settings.public_access_block", "  ✅ Accés públic bloquejat"),
    ("setup.settings.versioning", "  ✅ Control de versions activat"),
    ("setup.settings.lifecycle", "  ✅ Política de cicle de vida definida (retenció de {days} dies)"),
    ("setup.settings.encryption", "  ✅ Xifratge al servidor activat ({algorithm})"),
    (
        "setup.settings.failed",
        "  ⚠️ Avís: no s'han pogut configurar alguns paràmetres: {error}",
    ),
    ("setup.probe.header", "🧪 Provant l'accés al bucket..."),
    ("setup.probe.write", "  ✅ Accés d'escriptura confirmat"),
    ("setup.probe.read", "  ✅ Accés de lectura confirmat"),
    ("setup.probe.presign", "  ✅ Generació d'URL presignada confirmada"),
    ("setup.probe.cleanup", "  ✅ Neteja de la prova completada"),
    ("setup.probe.failed", "  ❌ La prova d'accés ha fallat: {error}"),
    (
        "setup.probe.cleanup_failed",
        "  ⚠️ Avís: no s'ha pogut eliminar l'objecte de prova: {error}",
    ),
    ("setup.complete", "🎉 Configuració completada!"),
    ("setup.bucket_name", "📋 Nom del bucket: {bucket}"),
    ("setup.launch.header", "🔧 Utilitza aquesta ordre per iniciar el servidor MCP:"),
    ("setup.launch.command", "   {hint} --bucket {bucket} --root /ruta/a/la/carpeta/de/pujades"),
    ("setup.save_name", "📝 Desa aquest nom de bucket: {bucket}"),
    ("setup.next", "🔄 Ara ja pots provar el servidor MCP!"),
    ("setup.failed", "❌ La configuració ha fallat. Comprova els permisos d'AWS."),
    ("check.banner", "🧪 Prova de connexió amb AWS S3"),
    ("check.intro", "📋 Aquesta comprovació provarà les credencials d'AWS de {env_file}"),
    ("check.source", "🔐 Provant les credencials d'AWS del fitxer {env_file}..."),
    ("check.missing.header", "❌ Falten variables d'entorn obligatòries:"),
    ("check.missing.item", "   - {var}"),
    ("check.missing.template_header", "💡 Crea un fitxer {env_file} amb el format següent:"),
    ("check.step.credentials", "{marker} Provant les credencials d'AWS..."),
    ("check.credentials.valid", "   ✅ Credencials vàlides!"),
    ("check.credentials.account", "   🆔 ID del compte: {account}"),
    ("check.credentials.arn", "   👤 ARN de l'usuari: {arn}"),
    ("check.step.client", "{marker} Provant el client S3..."),
    ("check.client.ok", "   ✅ Client S3 creat correctament!"),
    ("check.client.region", "   🌍 Regió: {region}"),
    ("check.step.bucket", "{marker} Provant l'accés al bucket '{bucket}'..."),
    ("check.bucket.ok", "   ✅ El bucket '{bucket}' existeix i és accessible!"),
    ("check.bucket.not_found", "   ❌ El bucket '{bucket}' no existeix!"),
    ("check.bucket.denied", "   ❌ Accés denegat al bucket '{bucket}'!"),
    ("check.bucket.denied_hint", "   💡 Comprova els permisos de l'usuari IAM"),
    ("check.bucket.failed", "   ❌ Error en accedir al bucket: {error}"),
    ("check.step.upload", "{marker} Provant el permís de pujada..."),
    ("check.upload.ok", "   ✅ Permís de pujada confirmat!"),
    ("check.upload.failed", "   ❌ La pujada ha fallat: {error}"),
    ("check.step.download", "{marker} Provant el permís de baixada..."),
    ("check.download.ok", "   ✅ Permís de baixada confirmat!"),
    ("check.download.mismatch", "   ❌ El contingut baixat no coincideix!"),
    ("check.download.failed", "   ❌ La baixada ha fallat: {error}"),
    ("check.step.presign", "{marker} Provant la generació d'URL presignades..."),
    ("check.presign.ok", "   ✅ URL presignada generada correctament!"),
    ("check.presign.url", "   🔗 URL: {url}"),
    ("check.presign.failed", "   ❌ La generació de l'URL presignada ha fallat: {error}"),
    ("check.step.cleanup", "{marker} Netejant el fitxer de prova..."),
    ("check.cleanup.ok", "   ✅ Fitxer de prova eliminat!"),
    ("check.cleanup.failed", "   ⚠️ Avís: no s'ha pogut eliminar el fitxer de prova: {error}"),
    ("check.error.invalid_key", "❌ L'ID de clau d'accés d'AWS no és vàlid!"),
    ("check.error.invalid_secret", "❌ La clau d'accés secreta d'AWS no és vàlida!"),
    ("check.error.no_credentials", "❌ No s'han trobat credencials d'AWS o no són vàlides!"),
    ("check.error.other", "❌ Error d'AWS: {error}"),
    ("check.passed", "🎉 Totes les proves han passat! La configuració d'AWS funciona correctament."),
    ("check.launch.header", "🚀 Ara pots executar el servidor MCP amb:"),
    ("check.launch.command", "   {hint} --bucket {bucket} --root /ruta/a/la/carpeta/de/pujades"),
    ("check.ready", "✅ La configuració està a punt per al servidor MCP!"),
    ("check.failed", "❌ Corregeix els problemes anteriors abans d'executar el servidor MCP."),
    ("check.help.header", "💡 Necessites ajuda?"),
    ("check.help.env_file", "   1. Comprova que el fitxer {env_file} té les credencials correctes"),
    ("check.help.permissions", "   2. Verifica que l'usuari IAM té permisos d'S3"),
    ("check.help.bucket", "   3. Confirma que el nom del bucket és correcte"),
    ("mcp.smoke.banner", "🚀 Iniciant la prova del servidor MCP de pujada a S3..."),
    ("mcp.bucket_missing", "❌ No s'ha trobat {var} a {env_file}"),
    ("mcp.upload_root.failed", "❌ No s'ha pogut crear el directori de pujades {path}: {error}"),
    ("mcp.file.created", "📝 Fitxer de prova creat: {path}"),
    ("mcp.file.creating", "📝 Creant el fitxer de prova..."),
    ("mcp.file.created_size", "📏 Fitxer de prova creat: {size} bytes"),
    ("mcp.file.create_failed", "❌ No s'ha pogut crear el fitxer de prova {path}: {error}"),
    ("mcp.file.cleaned", "🧹 Fitxer de prova eliminat"),
    ("mcp.file.cleanup_failed", "⚠️ No s'ha pogut eliminar el fitxer de prova {path}: {error}"),
    ("mcp.connecting", "🔌 Connectant amb el servidor MCP..."),
    ("mcp.tools.header", "📋 Eines disponibles:"),
    ("mcp.tools.item", "  • {name}: {description}"),
    ("mcp.tools.no_description", "(sense descripció)"),
    ("mcp.upload.start", "📤 Provant la pujada de fitxers..."),
    ("mcp.upload.ok", "✅ Pujada correcta!"),
    ("mcp.upload.result", "📊 Resultat: {result}"),
    ("mcp.upload.url", "🔗 URL presignada: {url}"),
    ("mcp.upload.size", "📏 Mida del fitxer: {size} bytes"),
    ("mcp.upload.mime", "🎭 Tipus MIME: {mime_type}"),
    ("mcp.upload.key", "🔑 Clau S3: {key}"),
    ("mcp.upload.bucket", "🪣 Bucket S3: {bucket}"),
    ("mcp.failed", "❌ La prova ha fallat: {error}"),
    ("mcp.progress.start", "🚀 Iniciant la pujada amb seguiment del progrés..."),
    ("mcp.progress.line", "📊 Progrés: {label} {message}"),
    ("mcp.progress.done", "✅ Pujada completada!"),
    ("mcp.progress.url", "🔗 URL: {url}"),
    ("mcp.progress.size", "📏 Mida final: {size} bytes"),
    ("mcp.progress.bucket", "🪣 Pujat al bucket: {bucket}"),
    ("mcp.progress.cleaned", "🧹 Fitxer de prova netejat"),
    ("mcp.client.failed", "La petició MCP ha fallat: {error}"),
    ("mcp.client.input_parse_failed", "No s'ha pogut analitzar el JSON d'entrada de l'eina: {error}"),
];

/// Returns the raw catalog entries for the requested locale.
#[cfg(test)]
pub(crate) const fn catalog_entries_for(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::En => CATALOG_EN,
        Locale::Ca => CATALOG_CA,
    }
}

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_CA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect()),
        Locale::Ca => CATALOG_CA_MAP.get_or_init(|| CATALOG_CA.iter().copied().collect()),
    }
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let locale = current_locale();
    let template = catalog_for(locale)
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
